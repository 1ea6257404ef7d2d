//! Symbols already proven unresolvable.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// Append-only set of symbols that no strategy could resolve.
///
/// Lives for the lifetime of the loader; never persisted. Interior
/// mutability lets a shared, frozen loader still record misses.
#[derive(Debug, Default)]
pub struct NegativeCache {
    missing: RwLock<HashSet<String>>,
}

impl NegativeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.missing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(symbol)
    }

    /// Remember `symbol` as missing. Returns `false` if it already was.
    pub fn record(&self, symbol: &str) -> bool {
        self.missing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.missing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_and_contains() {
        let cache = NegativeCache::new();
        assert!(!cache.contains("Foo"));
        assert!(cache.record("Foo"));
        assert!(!cache.record("Foo"));
        assert!(cache.contains("Foo"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(NegativeCache::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.record(&format!("Missing{i}"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 4);
        assert!(cache.contains("Missing3"));
    }
}
