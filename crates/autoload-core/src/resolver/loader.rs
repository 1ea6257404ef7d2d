//! PSR-4 / PSR-0 / class-map loader.
//!
//! Lookup order for a symbol:
//! 1. strip one leading `\`
//! 2. class map (returns without touching the filesystem)
//! 3. authoritative class map or known-missing symbol: miss, no probes
//! 4. for each extension (`.php`, then `.hh` when enabled):
//!    PSR-4 prefixes, PSR-4 fallbacks, PSR-0 prefixes, PSR-0 fallbacks,
//!    then the include path when enabled
//! 5. record the symbol as missing
//!
//! A miss is a `None`, never an error, so the host can ask the next
//! resolver in its chain.

use super::chain::{ResolverChain, SymbolResolver, UnitLoader};
use super::direct_map::DirectMap;
use super::negative_cache::NegativeCache;
use super::prefix::{
    psr0_logical_path, psr4_logical_path, CandidateOrigin, LegacyPrefixTable, PrefixTable,
    RegisterMode, NAMESPACE_SEPARATOR,
};
use super::probe::{FileProbe, FsProbe};
use super::search_path::{IncludePath, SearchPath};
use super::trace::{
    steps, strategies, warning_codes, ResolveTrace, ResolveTraceStep, TraceWarning,
};
use crate::error::Error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extension always tried.
pub const PRIMARY_EXTENSION: &str = ".php";

/// Extension tried second when the host runs Hack sources.
pub const SECONDARY_EXTENSION: &str = ".hh";

/// Maximum number of tried paths to record.
const MAX_TRIED_PATHS: usize = 20;

/// Resolver configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Also probe [`SECONDARY_EXTENSION`] after [`PRIMARY_EXTENSION`] fails.
    pub secondary_extension: bool,
}

impl ResolverConfig {
    /// Extensions to probe, in preference order.
    pub fn extensions(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(PRIMARY_EXTENSION)
            .chain(self.secondary_extension.then_some(SECONDARY_EXTENSION))
    }
}

/// Which strategy produced a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveSource {
    ClassMap,
    Psr4Prefix,
    Psr4Fallback,
    Psr0Prefix,
    Psr0Fallback,
    IncludePath,
}

impl ResolveSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClassMap => "class_map",
            Self::Psr4Prefix => strategies::PSR4_PREFIX,
            Self::Psr4Fallback => strategies::PSR4_FALLBACK,
            Self::Psr0Prefix => strategies::PSR0_PREFIX,
            Self::Psr0Fallback => strategies::PSR0_FALLBACK,
            Self::IncludePath => strategies::INCLUDE_PATH,
        }
    }
}

/// Reason codes for unresolved symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolveReasonCode {
    /// Nothing left after stripping the leading separator.
    EmptySymbol,
    /// Class map is authoritative and has no entry.
    AuthoritativeMiss,
    /// An earlier lookup already failed for this symbol.
    KnownMissing,
    /// Every extension and strategy was tried.
    NotFound,
}

impl std::fmt::Display for ResolveReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EmptySymbol => "EMPTY_SYMBOL",
            Self::AuthoritativeMiss => "AUTHORITATIVE_MISS",
            Self::KnownMissing => "KNOWN_MISSING",
            Self::NotFound => "NOT_FOUND",
        };
        write!(f, "{s}")
    }
}

/// Resolution result.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    /// Symbol after normalization.
    pub symbol: String,
    /// Resolved path (if successful).
    pub resolved: Option<PathBuf>,
    /// Strategy that found the file.
    pub source: Option<ResolveSource>,
    /// Reason code if unresolved.
    pub reason: Option<ResolveReasonCode>,
    /// Candidate paths probed (capped).
    pub tried: Vec<PathBuf>,
}

impl ResolveResult {
    fn from_outcome(symbol: &str, outcome: Outcome, tried: Vec<PathBuf>) -> Self {
        match outcome {
            Ok((path, source)) => Self {
                symbol: symbol.to_string(),
                resolved: Some(path),
                source: Some(source),
                reason: None,
                tried,
            },
            Err(reason) => Self {
                symbol: symbol.to_string(),
                resolved: None,
                source: None,
                reason: Some(reason),
                tried,
            },
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Result of resolution with trace.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveResultWithTrace {
    pub result: ResolveResult,
    pub trace: ResolveTrace,
}

type Outcome = Result<(PathBuf, ResolveSource), ResolveReasonCode>;

/// Collects tried paths and trace steps when asked to; free otherwise.
struct Recorder<'t> {
    trace: Option<&'t mut ResolveTrace>,
    tried: Option<Vec<PathBuf>>,
}

impl<'t> Recorder<'t> {
    fn silent() -> Self {
        Self {
            trace: None,
            tried: None,
        }
    }

    fn collecting(trace: Option<&'t mut ResolveTrace>) -> Self {
        Self {
            trace,
            tried: Some(Vec::new()),
        }
    }

    fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    fn step(&mut self, build: impl FnOnce() -> ResolveTraceStep) {
        if let Some(trace) = self.trace.as_deref_mut() {
            trace.add_step(build());
        }
    }

    fn warn(&mut self, build: impl FnOnce() -> TraceWarning) {
        if let Some(trace) = self.trace.as_deref_mut() {
            trace.add_warning(build());
        }
    }

    fn probe(
        &mut self,
        probe: &dyn FileProbe,
        path: &Path,
        strategy: &'static str,
        ext: &'static str,
        prefix: Option<&str>,
    ) -> bool {
        let found = probe.is_file(path);

        if let Some(tried) = self.tried.as_mut() {
            if tried.len() < MAX_TRIED_PATHS {
                tried.push(path.to_path_buf());
            }
        }

        self.step(|| {
            let detail = if found { "File exists" } else { "File not found" };
            let step = ResolveTraceStep::new(steps::FILE_EXISTS, found, detail)
                .with_path(path)
                .with_strategy(strategy)
                .with_extension(ext);
            match prefix {
                Some(p) => step.with_prefix(p),
                None => step,
            }
        });

        found
    }

    fn into_tried(self) -> Vec<PathBuf> {
        self.tried.unwrap_or_default()
    }
}

/// Strip a single leading namespace separator.
#[must_use]
pub fn normalize_symbol(symbol: &str) -> &str {
    symbol.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(symbol)
}

fn collect_dirs<I, P>(dirs: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    dirs.into_iter().map(Into::into).collect()
}

/// Class loader combining a class map, PSR-4 and PSR-0 tables, and a
/// negative cache.
///
/// Registration takes `&mut self` and happens during bootstrap. Afterwards
/// the loader is typically frozen behind an [`Arc`] and shared; lookups take
/// `&self` and only the negative cache changes.
#[derive(Debug)]
pub struct ClassLoader {
    psr4: PrefixTable,
    psr0: LegacyPrefixTable,
    class_map: DirectMap,
    missing: NegativeCache,
    use_include_path: bool,
    config: ResolverConfig,
    probe: Box<dyn FileProbe>,
    search_path: Box<dyn SearchPath>,
}

impl Default for ClassLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            psr4: PrefixTable::new(),
            psr0: LegacyPrefixTable::new(),
            class_map: DirectMap::new(),
            missing: NegativeCache::new(),
            use_include_path: false,
            config: ResolverConfig::default(),
            probe: Box::new(FsProbe),
            search_path: Box::new(IncludePath::default()),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Replace the existence probe (instrumentation, virtual filesystems).
    pub fn set_probe(&mut self, probe: Box<dyn FileProbe>) {
        self.probe = probe;
    }

    /// Replace the search path consulted when the include path is enabled.
    pub fn set_search_path(&mut self, search_path: Box<dyn SearchPath>) {
        self.search_path = search_path;
    }

    #[must_use]
    pub fn search_path(&self) -> &dyn SearchPath {
        self.search_path.as_ref()
    }

    // -------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------

    /// Register PSR-4 directories for a namespace prefix (with trailing `\`),
    /// appending or prepending to any already set. The empty prefix registers
    /// fallback directories for the root namespace.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPrefix`] if a new non-empty prefix lacks its
    /// trailing separator.
    pub fn add_psr4<I, P>(&mut self, prefix: &str, dirs: I, prepend: bool) -> Result<(), Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.psr4.register(
            prefix,
            collect_dirs(dirs),
            RegisterMode::from_prepend(prepend),
        )?;
        tracing::debug!(prefix, prepend, "registered PSR-4 directories");
        Ok(())
    }

    /// Register PSR-4 directories for a prefix, replacing any already set.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPrefix`] if a non-empty prefix lacks its
    /// trailing separator.
    pub fn set_psr4<I, P>(&mut self, prefix: &str, dirs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.psr4
            .register(prefix, collect_dirs(dirs), RegisterMode::Replace)?;
        tracing::debug!(prefix, "set PSR-4 directories");
        Ok(())
    }

    /// Register PSR-0 directories for a prefix, appending or prepending.
    /// The empty prefix registers fallback directories.
    pub fn add<I, P>(&mut self, prefix: &str, dirs: I, prepend: bool)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.psr0.register(
            prefix,
            collect_dirs(dirs),
            RegisterMode::from_prepend(prepend),
        );
        tracing::debug!(prefix, prepend, "registered PSR-0 directories");
    }

    /// Register PSR-0 directories for a prefix, replacing any already set.
    pub fn set<I, P>(&mut self, prefix: &str, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.psr0
            .register(prefix, collect_dirs(dirs), RegisterMode::Replace);
        tracing::debug!(prefix, "set PSR-0 directories");
    }

    /// Merge entries into the class map; later entries win.
    pub fn add_class_map<I, K, P>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<PathBuf>,
    {
        self.class_map.merge(entries);
        tracing::debug!(entries = self.class_map.len(), "merged class map");
    }

    /// Make the class map the only source of truth.
    pub fn set_class_map_authoritative(&mut self, authoritative: bool) {
        self.class_map.set_authoritative(authoritative);
    }

    /// Consult the search path after every directory strategy failed.
    pub fn set_use_include_path(&mut self, use_include_path: bool) {
        self.use_include_path = use_include_path;
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// PSR-0 prefixes across all buckets.
    #[must_use]
    pub fn prefixes(&self) -> IndexMap<String, Vec<PathBuf>> {
        self.psr0.prefixes()
    }

    #[must_use]
    pub fn prefixes_psr4(&self) -> &IndexMap<String, Vec<PathBuf>> {
        self.psr4.prefixes()
    }

    #[must_use]
    pub fn fallback_dirs(&self) -> &[PathBuf] {
        self.psr0.fallback_dirs()
    }

    #[must_use]
    pub fn fallback_dirs_psr4(&self) -> &[PathBuf] {
        self.psr4.fallback_dirs()
    }

    #[must_use]
    pub fn class_map(&self) -> &IndexMap<String, PathBuf> {
        self.class_map.entries()
    }

    #[must_use]
    pub fn is_class_map_authoritative(&self) -> bool {
        self.class_map.is_authoritative()
    }

    #[must_use]
    pub fn use_include_path(&self) -> bool {
        self.use_include_path
    }

    /// Number of symbols recorded as unresolvable so far.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// Find the file defining `symbol`.
    #[must_use]
    pub fn find_file(&self, symbol: &str) -> Option<PathBuf> {
        self.lookup_with(symbol, &mut Recorder::silent())
            .ok()
            .map(|(path, _)| path)
    }

    /// Like [`find_file`](Self::find_file), reporting the winning strategy or
    /// the reason for a miss, plus the candidates probed.
    #[must_use]
    pub fn lookup(&self, symbol: &str) -> ResolveResult {
        let mut recorder = Recorder::collecting(None);
        let outcome = self.lookup_with(symbol, &mut recorder);
        ResolveResult::from_outcome(normalize_symbol(symbol), outcome, recorder.into_tried())
    }

    /// Resolve with a step-by-step trace.
    ///
    /// Runs exactly the lookup [`find_file`](Self::find_file) runs, including
    /// recording misses in the negative cache.
    #[must_use]
    pub fn explain(&self, symbol: &str) -> ResolveResultWithTrace {
        let mut trace = ResolveTrace::new();

        let (outcome, tried) = {
            let mut recorder = Recorder::collecting(Some(&mut trace));
            let outcome = self.lookup_with(symbol, &mut recorder);
            (outcome, recorder.into_tried())
        };

        match &outcome {
            Ok((path, source)) => trace.add_step(
                ResolveTraceStep::new(
                    steps::FINAL_PATH,
                    true,
                    format!("Resolved via {}", source.as_str()),
                )
                .with_path(path),
            ),
            Err(reason) => trace.failure(steps::FINAL_PATH, format!("Unresolved: {reason}")),
        }

        ResolveResultWithTrace {
            result: ResolveResult::from_outcome(normalize_symbol(symbol), outcome, tried),
            trace,
        }
    }

    /// Resolve `symbol` and hand the file to `loader`.
    ///
    /// Returns `Ok(false)` on a miss so the caller can fall through to other
    /// resolvers.
    ///
    /// # Errors
    /// Propagates the loader's error.
    pub fn load_class(&self, symbol: &str, loader: &dyn UnitLoader) -> Result<bool, Error> {
        let Some(path) = self.find_file(symbol) else {
            return Ok(false);
        };
        loader.load(normalize_symbol(symbol), &path)?;
        Ok(true)
    }

    /// Install this loader in `chain`. Returns `false` if it already was.
    pub fn register(self: &Arc<Self>, chain: &mut ResolverChain, prepend: bool) -> bool {
        chain.register(Arc::clone(self) as Arc<dyn SymbolResolver>, prepend)
    }

    /// Remove this loader from `chain`. Returns `false` if it was not installed.
    pub fn unregister(self: &Arc<Self>, chain: &mut ResolverChain) -> bool {
        let link: Arc<dyn SymbolResolver> = Arc::clone(self) as Arc<dyn SymbolResolver>;
        chain.unregister(&link)
    }

    fn lookup_with(&self, symbol: &str, rec: &mut Recorder<'_>) -> Outcome {
        let normalized = normalize_symbol(symbol);
        if normalized.len() != symbol.len() {
            rec.warn(|| {
                TraceWarning::new(
                    warning_codes::LEADING_SEPARATOR,
                    format!("Leading separator stripped from {symbol}"),
                )
            });
        }

        if normalized.is_empty() {
            rec.step(|| ResolveTraceStep::new(steps::NORMALIZE_SYMBOL, false, "Symbol is empty"));
            return Err(ResolveReasonCode::EmptySymbol);
        }
        rec.step(|| {
            ResolveTraceStep::new(
                steps::NORMALIZE_SYMBOL,
                true,
                format!("Symbol: {normalized}"),
            )
        });

        if let Some(path) = self.class_map.get(normalized) {
            rec.step(|| {
                ResolveTraceStep::new(steps::CLASS_MAP, true, "Class map entry").with_path(path)
            });
            return Ok((path.to_path_buf(), ResolveSource::ClassMap));
        }
        rec.step(|| ResolveTraceStep::new(steps::CLASS_MAP, false, "No class map entry"));

        if self.class_map.is_authoritative() {
            tracing::trace!(symbol = normalized, "authoritative class map miss");
            rec.step(|| {
                ResolveTraceStep::new(
                    steps::AUTHORITATIVE,
                    false,
                    "Class map is authoritative; directories not searched",
                )
            });
            return Err(ResolveReasonCode::AuthoritativeMiss);
        }

        if self.missing.contains(normalized) {
            rec.step(|| {
                ResolveTraceStep::new(
                    steps::NEGATIVE_CACHE,
                    false,
                    "Symbol already known to be missing",
                )
            });
            return Err(ResolveReasonCode::KnownMissing);
        }

        for ext in self.config.extensions() {
            rec.step(|| {
                ResolveTraceStep::new(steps::TRY_EXTENSION, true, format!("Trying {ext}"))
                    .with_extension(ext)
            });

            if let Some(found) = self.find_with_extension(normalized, ext, rec) {
                if ext != PRIMARY_EXTENSION {
                    rec.warn(|| {
                        TraceWarning::new(
                            warning_codes::SECONDARY_EXTENSION,
                            format!("Resolved only with {ext}"),
                        )
                    });
                }
                return Ok(found);
            }
        }

        self.missing.record(normalized);
        tracing::debug!(symbol = normalized, "symbol not found; recorded as missing");
        rec.step(|| {
            ResolveTraceStep::new(
                steps::RECORD_MISSING,
                false,
                "No candidate exists; later lookups skip the filesystem",
            )
        });
        Err(ResolveReasonCode::NotFound)
    }

    fn find_with_extension(
        &self,
        symbol: &str,
        ext: &'static str,
        rec: &mut Recorder<'_>,
    ) -> Option<(PathBuf, ResolveSource)> {
        let probe = self.probe.as_ref();

        let psr4_path = psr4_logical_path(symbol, ext);
        for candidate in self.psr4.candidates(symbol, &psr4_path) {
            let (strategy, source, prefix) = match candidate.origin {
                CandidateOrigin::Prefix(p) => {
                    (strategies::PSR4_PREFIX, ResolveSource::Psr4Prefix, Some(p))
                }
                CandidateOrigin::Fallback => {
                    (strategies::PSR4_FALLBACK, ResolveSource::Psr4Fallback, None)
                }
            };
            let path = candidate.path();
            if rec.probe(probe, &path, strategy, ext, prefix) {
                if let (Some(winner), true) = (prefix, rec.is_tracing()) {
                    self.warn_shadowed(symbol, winner, rec);
                }
                return Some((path, source));
            }
        }

        let psr0_path = psr0_logical_path(symbol, &psr4_path, ext);
        for candidate in self.psr0.candidates(symbol, &psr0_path) {
            let (strategy, source, prefix) = match candidate.origin {
                CandidateOrigin::Prefix(p) => {
                    (strategies::PSR0_PREFIX, ResolveSource::Psr0Prefix, Some(p))
                }
                CandidateOrigin::Fallback => {
                    (strategies::PSR0_FALLBACK, ResolveSource::Psr0Fallback, None)
                }
            };
            let path = candidate.path();
            if rec.probe(probe, &path, strategy, ext, prefix) {
                return Some((path, source));
            }
        }

        if self.use_include_path {
            let found = self.search_path.find(&psr0_path, probe);
            rec.step(|| {
                let step = ResolveTraceStep::new(
                    steps::INCLUDE_PATH,
                    found.is_some(),
                    format!("Include path lookup for {psr0_path}"),
                )
                .with_strategy(strategies::INCLUDE_PATH)
                .with_extension(ext);
                match &found {
                    Some(path) => step.with_path(path),
                    None => step,
                }
            });
            if let Some(path) = found {
                return Some((path, ResolveSource::IncludePath));
            }
        }

        None
    }

    fn warn_shadowed(&self, symbol: &str, winner: &str, rec: &mut Recorder<'_>) {
        let longer: Vec<&str> = self
            .psr4
            .matching_prefixes(symbol)
            .filter(|p| p.len() > winner.len())
            .collect();
        if longer.is_empty() {
            return;
        }
        rec.warn(|| {
            TraceWarning::new(
                warning_codes::SHADOWED_PREFIX,
                format!(
                    "Prefix {winner} was registered before longer matching prefix(es) {}",
                    longer.join(", ")
                ),
            )
        });
    }
}

impl SymbolResolver for ClassLoader {
    fn resolve(&self, symbol: &str) -> Option<PathBuf> {
        self.find_file(symbol)
    }
}
