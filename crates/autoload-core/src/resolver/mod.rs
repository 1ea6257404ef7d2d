//! Class resolver: symbol name -> defining file.
//!
//! Combines a class map, PSR-4 and PSR-0 prefix tables, a negative cache
//! and an optional include path. See [`ClassLoader`] for the lookup order.

mod chain;
mod direct_map;
mod loader;
mod negative_cache;
pub mod prefix;
mod probe;
mod search_path;
pub mod trace;

pub use chain::{ResolverChain, SymbolResolver, UnitLoader};
pub use direct_map::DirectMap;
pub use loader::{
    normalize_symbol, ClassLoader, ResolveReasonCode, ResolveResult, ResolveResultWithTrace,
    ResolveSource, ResolverConfig, PRIMARY_EXTENSION, SECONDARY_EXTENSION,
};
pub use negative_cache::NegativeCache;
pub use prefix::{
    Candidate, CandidateOrigin, LegacyPrefixTable, PrefixTable, RegisterMode,
    NAMESPACE_SEPARATOR,
};
pub use probe::{CountingProbe, FileProbe, FsProbe};
pub use search_path::{IncludePath, SearchPath};
pub use trace::{
    steps as trace_steps, strategies as trace_strategies, warning_codes as trace_warning_codes,
    ResolveTrace, ResolveTraceStep, TraceWarning,
};
