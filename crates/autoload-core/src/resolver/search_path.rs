//! Host search path consulted as the last strategy (the include path).

use super::prefix::join_under;
use super::probe::FileProbe;
use crate::paths::INCLUDE_PATH_ENV;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Resolves a PSR-0 relative path against a host-provided list of roots.
pub trait SearchPath: Send + Sync + std::fmt::Debug {
    fn find(&self, relative: &str, probe: &dyn FileProbe) -> Option<PathBuf>;
}

/// Ordered include-path directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludePath {
    dirs: Vec<PathBuf>,
}

impl IncludePath {
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Parse a platform path list (`:`-separated on Unix, `;` on Windows).
    #[must_use]
    pub fn parse(value: &OsStr) -> Self {
        Self {
            dirs: std::env::split_paths(value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
        }
    }

    /// Read `AUTOLOAD_INCLUDE_PATH`; empty when unset.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var_os(INCLUDE_PATH_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn extend(&mut self, dirs: impl IntoIterator<Item = PathBuf>) {
        self.dirs.extend(dirs);
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl SearchPath for IncludePath {
    fn find(&self, relative: &str, probe: &dyn FileProbe) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| join_under(dir, relative))
            .find(|candidate| probe.is_file(candidate))
    }
}
