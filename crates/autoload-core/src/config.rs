use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for the autoload CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Explicit manifest path; discovered from `cwd` when unset.
    pub manifest: Option<PathBuf>,

    /// Also register the `autoload-dev` section of the manifest.
    pub include_dev: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            manifest: None,
            include_dev: false,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Use an explicit manifest instead of discovering one.
    #[must_use]
    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Include `autoload-dev` registrations.
    #[must_use]
    pub fn with_dev(mut self, include_dev: bool) -> Self {
        self.include_dev = include_dev;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = Config::new(PathBuf::from("/proj"))
            .with_verbosity(2)
            .with_json_logs(true)
            .with_manifest(Some(PathBuf::from("/proj/autoload.json")))
            .with_dev(true);

        assert_eq!(config.cwd, PathBuf::from("/proj"));
        assert_eq!(config.verbosity, 2);
        assert!(config.json_logs);
        assert!(config.include_dev);
        assert_eq!(config.manifest, Some(PathBuf::from("/proj/autoload.json")));
    }

    #[test]
    fn test_defaults() {
        let config = Config::new(PathBuf::from("."));
        assert_eq!(config.verbosity, 0);
        assert!(!config.json_logs);
        assert!(config.manifest.is_none());
        assert!(!config.include_dev);
    }
}
