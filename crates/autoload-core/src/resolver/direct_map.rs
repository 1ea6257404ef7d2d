//! Exact symbol -> file table (the class map).

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Precomputed symbol -> path table, optionally the only source of truth.
#[derive(Debug, Clone, Default)]
pub struct DirectMap {
    entries: IndexMap<String, PathBuf>,
    authoritative: bool,
}

impl DirectMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&Path> {
        self.entries.get(symbol).map(PathBuf::as_path)
    }

    /// Merge entries; on a key collision the later path wins and the
    /// original insertion position is kept.
    pub fn merge<I, K, P>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<PathBuf>,
    {
        for (symbol, path) in entries {
            self.entries.insert(symbol.into(), path.into());
        }
    }

    /// When set, symbols missing from the map are never searched for on disk.
    pub fn set_authoritative(&mut self, authoritative: bool) {
        self.authoritative = authoritative;
    }

    #[must_use]
    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    #[must_use]
    pub fn entries(&self) -> &IndexMap<String, PathBuf> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_later_wins() {
        let mut map = DirectMap::new();
        map.merge([("A\\One", "/v1/One.php"), ("A\\Two", "/v1/Two.php")]);
        map.merge([("A\\One", "/v2/One.php")]);

        assert_eq!(map.get("A\\One"), Some(Path::new("/v2/One.php")));
        assert_eq!(map.get("A\\Two"), Some(Path::new("/v1/Two.php")));
        let keys: Vec<&str> = map.entries().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["A\\One", "A\\Two"]);
    }

    #[test]
    fn test_get_missing() {
        let map = DirectMap::new();
        assert!(map.get("Nope").is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_authoritative_flag() {
        let mut map = DirectMap::new();
        assert!(!map.is_authoritative());
        map.set_authoritative(true);
        assert!(map.is_authoritative());
    }
}
