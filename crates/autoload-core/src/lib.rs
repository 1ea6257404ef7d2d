#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod classmap;
pub mod config;
pub mod error;
pub mod manifest;
pub mod paths;
pub mod resolver;
pub mod version;

pub use classmap::{scan_symbols, ClassMap, DuplicateSymbol};
pub use config::Config;
pub use error::Error;
pub use manifest::{AutoloadSection, DirList, Manifest, ManifestConfig};
pub use resolver::{
    ClassLoader, IncludePath, ResolveReasonCode, ResolveResult, ResolveResultWithTrace,
    ResolveSource, ResolverChain, ResolverConfig, SymbolResolver, UnitLoader,
};
pub use version::{BuildInfo, SCHEMA_VERSION, VERSION};
