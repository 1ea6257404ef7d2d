//! Build identification shown by `autoload version` and stamped into JSON output.

use serde::Serialize;
use std::fmt;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Layout version of every JSON document the CLI prints. Consumers key on
/// this, so it changes only when a field is removed or changes meaning.
pub const SCHEMA_VERSION: u32 = 1;

/// What this binary was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub schema_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_hash: Option<&'static str>,
}

impl BuildInfo {
    /// Values fixed at compile time. `AUTOLOAD_BUILD_GIT_HASH` is optional.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version: VERSION,
            schema_version: SCHEMA_VERSION,
            git_hash: option_env!("AUTOLOAD_BUILD_GIT_HASH"),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "autoload {}", self.version)?;
        match self.git_hash {
            Some(hash) => write!(f, " ({hash})"),
            None => Ok(()),
        }
    }
}
