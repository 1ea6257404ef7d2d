use std::path::PathBuf;
use thiserror::Error;

/// Core error type for autoload operations.
///
/// Resolution misses are not errors; see [`crate::resolver::ClassLoader::find_file`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Project root not found from {start}")]
    ProjectNotFound { start: PathBuf },

    #[error("A non-empty PSR-4 prefix must end with a namespace separator: {prefix:?}")]
    InvalidPrefix { prefix: String },

    #[error("Invalid exclude pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to load {symbol} from {path}: {message}")]
    Load {
        symbol: String,
        path: PathBuf,
        message: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// True for registration-time validation failures.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidPrefix { .. } | Self::InvalidPattern { .. })
    }
}
