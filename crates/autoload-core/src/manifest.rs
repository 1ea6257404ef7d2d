//! Composer-style autoload manifest.
//!
//! Only the autoload-related keys are read; anything else in the document
//! (package metadata, requirements, scripts) is ignored.

use crate::classmap;
use crate::error::Error;
use crate::paths::resolve_dir;
use crate::resolver::{ClassLoader, IncludePath};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One directory or an ordered list of directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirList {
    One(String),
    Many(Vec<String>),
}

impl DirList {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            Self::One(dir) => std::slice::from_ref(dir),
            Self::Many(dirs) => dirs,
        };
        items.iter().map(String::as_str)
    }

    fn resolve(&self, base: &Path) -> Vec<PathBuf> {
        self.iter().map(|dir| resolve_dir(base, dir)).collect()
    }
}

/// An `autoload` or `autoload-dev` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoloadSection {
    #[serde(rename = "psr-4")]
    pub psr4: IndexMap<String, DirList>,

    #[serde(rename = "psr-0")]
    pub psr0: IndexMap<String, DirList>,

    /// Directories (or files) scanned into the class map.
    pub classmap: Vec<String>,

    /// Glob patterns, relative to the manifest directory, skipped while scanning.
    #[serde(rename = "exclude-from-classmap")]
    pub exclude_from_classmap: Vec<String>,
}

impl AutoloadSection {
    fn is_empty(&self) -> bool {
        self.psr4.is_empty() && self.psr0.is_empty() && self.classmap.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ManifestConfig {
    pub classmap_authoritative: bool,
    pub use_include_path: bool,
}

/// Parsed manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub autoload: AutoloadSection,

    #[serde(rename = "autoload-dev")]
    pub autoload_dev: AutoloadSection,

    #[serde(rename = "include-path")]
    pub include_path: Vec<String>,

    pub config: ManifestConfig,
}

impl Manifest {
    /// Read and parse a manifest file.
    ///
    /// # Errors
    /// Returns [`Error::ManifestRead`] or [`Error::ManifestParse`].
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse(&text, path)?;
        tracing::debug!(path = %path.display(), "loaded manifest");
        Ok(manifest)
    }

    /// Parse manifest text; `path` is only used for error reporting.
    ///
    /// # Errors
    /// Returns [`Error::ManifestParse`] on malformed JSON or wrong value shapes.
    pub fn parse(text: &str, path: &Path) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory a manifest's relative paths resolve against.
    #[must_use]
    pub fn base_dir(manifest_path: &Path) -> PathBuf {
        let dir = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
    }

    /// Sections in registration order.
    pub fn sections(&self, include_dev: bool) -> impl Iterator<Item = &AutoloadSection> {
        std::iter::once(&self.autoload).chain(include_dev.then_some(&self.autoload_dev))
    }

    /// The manifest's `include-path` entries resolved against `base_dir`.
    #[must_use]
    pub fn include_path(&self, base_dir: &Path) -> IncludePath {
        IncludePath::new(
            self.include_path
                .iter()
                .map(|dir| resolve_dir(base_dir, dir))
                .collect(),
        )
    }

    /// Build a loader from the manifest's registrations.
    ///
    /// Class-map directories are scanned here. The loader's search path is
    /// the manifest's `include-path`; callers may replace it.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPrefix`] for a PSR-4 prefix without its
    /// trailing separator and [`Error::InvalidPattern`] for a bad exclusion.
    pub fn build_loader(&self, base_dir: &Path, include_dev: bool) -> Result<ClassLoader, Error> {
        let mut loader = ClassLoader::new();

        for section in self.sections(include_dev) {
            if section.is_empty() {
                continue;
            }
            for (prefix, dirs) in &section.psr4 {
                loader.add_psr4(prefix, dirs.resolve(base_dir), false)?;
            }
            for (prefix, dirs) in &section.psr0 {
                loader.add(prefix, dirs.resolve(base_dir), false);
            }
            if !section.classmap.is_empty() {
                let dirs: Vec<PathBuf> = section
                    .classmap
                    .iter()
                    .map(|dir| resolve_dir(base_dir, dir))
                    .collect();
                let map = classmap::generate(&dirs, &section.exclude_from_classmap, base_dir)?;
                for dup in &map.duplicates {
                    tracing::warn!(
                        symbol = %dup.symbol,
                        kept = %dup.kept.display(),
                        ignored = %dup.ignored.display(),
                        "symbol declared more than once"
                    );
                }
                loader.add_class_map(map.entries);
            }
        }

        loader.set_class_map_authoritative(self.config.classmap_authoritative);
        loader.set_use_include_path(self.config.use_include_path);
        loader.set_search_path(Box::new(self.include_path(base_dir)));

        tracing::debug!(
            psr4 = loader.prefixes_psr4().len(),
            psr0 = loader.prefixes().len(),
            class_map = loader.class_map().len(),
            "built loader from manifest"
        );
        Ok(loader)
    }
}
