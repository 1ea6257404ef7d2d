//! Filesystem existence probes.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Existence check used for every candidate path.
///
/// Implementations must treat I/O errors as "does not exist" so that one
/// unreadable candidate never aborts a multi-directory search.
pub trait FileProbe: Send + Sync + std::fmt::Debug {
    fn is_file(&self, path: &Path) -> bool;
}

/// Probe backed by `std::fs::metadata`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl FileProbe for FsProbe {
    fn is_file(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok_and(|meta| meta.is_file())
    }
}

/// Filesystem probe that counts how many checks were made.
///
/// Clones share the counter, so a clone can be handed to a loader while the
/// original is kept for assertions.
#[derive(Debug, Clone, Default)]
pub struct CountingProbe {
    count: Arc<AtomicUsize>,
}

impl CountingProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

impl FileProbe for CountingProbe {
    fn is_file(&self, path: &Path) -> bool {
        self.count.fetch_add(1, Ordering::Relaxed);
        FsProbe.is_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_fs_probe_file_and_dir() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("Foo.php");
        fs::write(&file, "<?php").unwrap();

        assert!(FsProbe.is_file(&file));
        assert!(!FsProbe.is_file(dir.path()));
        assert!(!FsProbe.is_file(&dir.path().join("Missing.php")));
    }

    #[test]
    fn test_counting_probe_shares_counter() {
        let dir = tempdir().unwrap();
        let probe = CountingProbe::new();
        let handle = probe.clone();

        probe.is_file(&dir.path().join("a.php"));
        probe.is_file(&dir.path().join("b.php"));
        assert_eq!(handle.count(), 2);

        handle.reset();
        assert_eq!(probe.count(), 0);
    }
}
