//! Resolver chain owned by the host application.
//!
//! When the host cannot find a symbol it asks each installed resolver in
//! order; the first one that returns a path wins. The chain is a plain value
//! passed around by the host, so tests can build and tear one down freely.

use super::loader::normalize_symbol;
use crate::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One link in a [`ResolverChain`].
pub trait SymbolResolver: Send + Sync {
    /// Path of the file defining `symbol`, or `None` to defer to the next link.
    fn resolve(&self, symbol: &str) -> Option<PathBuf>;
}

impl<F> SymbolResolver for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn resolve(&self, symbol: &str) -> Option<PathBuf> {
        self(symbol)
    }
}

/// Host collaborator that executes the unit at a resolved path.
///
/// Only the symbol and path are passed; the loader never sees the
/// resolver's state.
pub trait UnitLoader {
    fn load(&self, symbol: &str, path: &Path) -> Result<(), Error>;
}

impl<F> UnitLoader for F
where
    F: Fn(&str, &Path) -> Result<(), Error>,
{
    fn load(&self, symbol: &str, path: &Path) -> Result<(), Error> {
        self(symbol, path)
    }
}

fn same_link(a: &Arc<dyn SymbolResolver>, b: &Arc<dyn SymbolResolver>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Ordered list of resolvers consulted on a symbol miss.
#[derive(Default)]
pub struct ResolverChain {
    links: Vec<Arc<dyn SymbolResolver>>,
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain")
            .field("links", &self.links.len())
            .finish()
    }
}

impl ResolverChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `link` at the end, or at the front when `prepend` is set.
    ///
    /// A link already present is left where it is and `false` is returned.
    pub fn register(&mut self, link: Arc<dyn SymbolResolver>, prepend: bool) -> bool {
        if self.contains(&link) {
            return false;
        }
        if prepend {
            self.links.insert(0, link);
        } else {
            self.links.push(link);
        }
        tracing::debug!(prepend, links = self.links.len(), "resolver registered");
        true
    }

    /// Remove `link`. Returns `false` if it was not installed.
    pub fn unregister(&mut self, link: &Arc<dyn SymbolResolver>) -> bool {
        let before = self.links.len();
        self.links.retain(|l| !same_link(l, link));
        let removed = self.links.len() != before;
        if removed {
            tracing::debug!(links = self.links.len(), "resolver unregistered");
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, link: &Arc<dyn SymbolResolver>) -> bool {
        self.links.iter().any(|l| same_link(l, link))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Drop every link.
    pub fn clear(&mut self) {
        self.links.clear();
    }

    /// Ask each link in order; the first path wins.
    #[must_use]
    pub fn resolve(&self, symbol: &str) -> Option<PathBuf> {
        self.links.iter().find_map(|link| link.resolve(symbol))
    }

    /// Resolve `symbol` and hand the file to `loader`.
    ///
    /// Returns `Ok(false)` when no link resolves the symbol. The loader may
    /// re-enter the chain to resolve further symbols. A leading `\` is
    /// stripped before the links and the loader see the symbol.
    ///
    /// # Errors
    /// Propagates the loader's error.
    pub fn load(&self, symbol: &str, loader: &dyn UnitLoader) -> Result<bool, Error> {
        let symbol = normalize_symbol(symbol);
        match self.resolve(symbol) {
            Some(path) => {
                loader.load(symbol, &path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
