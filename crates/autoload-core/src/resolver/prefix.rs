//! Prefix registries for the two naming conventions.
//!
//! PSR-4 maps a namespace prefix (ending in `\`) to base directories and
//! mirrors the rest of the symbol below them. PSR-0 appends the whole
//! symbol, with underscores in the class segment turned into directories.
//!
//! Both tables bucket prefixes by their first character. Inside a bucket,
//! prefixes keep registration order and the first matching prefix is tried
//! first, whatever its length.

use crate::error::Error;
use indexmap::IndexMap;
use std::ffi::OsString;
use std::path::{is_separator, Path, PathBuf, MAIN_SEPARATOR_STR};

/// Namespace separator in symbol names.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// How a registration combines with directories already set for a prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterMode {
    /// Add after existing directories.
    Append,
    /// Add before existing directories.
    Prepend,
    /// Drop existing directories.
    Replace,
}

impl RegisterMode {
    /// `Prepend` when `prepend` is set, `Append` otherwise.
    #[must_use]
    pub fn from_prepend(prepend: bool) -> Self {
        if prepend {
            Self::Prepend
        } else {
            Self::Append
        }
    }
}

fn merge_dirs(existing: &mut Vec<PathBuf>, dirs: Vec<PathBuf>, mode: RegisterMode) {
    match mode {
        RegisterMode::Append => existing.extend(dirs),
        RegisterMode::Prepend => {
            existing.splice(0..0, dirs);
        }
        RegisterMode::Replace => *existing = dirs,
    }
}

/// Which part of a table produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin<'a> {
    /// A registered prefix matched the symbol.
    Prefix(&'a str),
    /// A fallback (root namespace) directory.
    Fallback,
}

/// A directory paired with the path to try below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub dir: &'a Path,
    pub relative: &'a str,
    pub origin: CandidateOrigin<'a>,
}

impl Candidate<'_> {
    /// Full path to probe.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        join_under(self.dir, self.relative)
    }
}

/// `dir` + separator + `relative`, by concatenation.
///
/// Unlike [`Path::join`], a `relative` that starts with a separator (from a
/// doubled or extra `\` in the symbol) stays below `dir`.
#[must_use]
pub fn join_under(dir: &Path, relative: &str) -> PathBuf {
    let mut joined = OsString::from(dir.as_os_str());
    let ends_with_separator = dir
        .as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|&b| is_separator(char::from(b)));
    if !ends_with_separator {
        joined.push(MAIN_SEPARATOR_STR);
    }
    joined.push(relative);
    PathBuf::from(joined)
}

/// PSR-4 relative path: every `\` becomes a path separator, then `ext` is appended.
#[must_use]
pub fn psr4_logical_path(symbol: &str, ext: &str) -> String {
    let mut path = symbol.replace(NAMESPACE_SEPARATOR, MAIN_SEPARATOR_STR);
    path.push_str(ext);
    path
}

/// PSR-0 relative path derived from the PSR-4 one.
///
/// For a namespaced symbol only the class segment (after the last `\`) has
/// its underscores transliterated. A symbol without `\` is PEAR-style and
/// every underscore becomes a separator.
#[must_use]
pub fn psr0_logical_path(symbol: &str, psr4_path: &str, ext: &str) -> String {
    match symbol.rfind(NAMESPACE_SEPARATOR) {
        Some(pos) => {
            // Separators are single bytes on every platform, so byte offsets line up.
            let (namespace, class) = psr4_path.split_at(pos + 1);
            format!("{namespace}{}", class.replace('_', MAIN_SEPARATOR_STR))
        }
        None => {
            let mut path = symbol.replace('_', MAIN_SEPARATOR_STR);
            path.push_str(ext);
            path
        }
    }
}

/// PSR-4 prefix table.
#[derive(Debug, Clone, Default)]
pub struct PrefixTable {
    /// First character -> prefix -> byte length, in registration order.
    lengths: IndexMap<char, IndexMap<String, usize>>,
    /// Prefix -> directories, in registration order.
    dirs: IndexMap<String, Vec<PathBuf>>,
    fallback: Vec<PathBuf>,
}

impl PrefixTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register directories for `prefix`; the empty prefix targets the fallback list.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPrefix`] when a new or replaced non-empty prefix
    /// does not end with `\`. Nothing is registered in that case.
    pub fn register(
        &mut self,
        prefix: &str,
        dirs: Vec<PathBuf>,
        mode: RegisterMode,
    ) -> Result<(), Error> {
        if prefix.is_empty() {
            merge_dirs(&mut self.fallback, dirs, mode);
            return Ok(());
        }

        if mode != RegisterMode::Replace {
            if let Some(existing) = self.dirs.get_mut(prefix) {
                merge_dirs(existing, dirs, mode);
                return Ok(());
            }
        }

        let Some(first) = prefix.chars().next() else {
            return Ok(());
        };
        if !prefix.ends_with(NAMESPACE_SEPARATOR) {
            return Err(Error::InvalidPrefix {
                prefix: prefix.to_string(),
            });
        }

        self.lengths
            .entry(first)
            .or_default()
            .insert(prefix.to_string(), prefix.len());
        self.dirs.insert(prefix.to_string(), dirs);
        Ok(())
    }

    /// Lazily yield `(directory, relative path)` pairs for `symbol`.
    ///
    /// `logical` must be [`psr4_logical_path`] of `symbol`. Prefix candidates
    /// come first, sliced past the prefix; fallback directories follow with
    /// the full logical path.
    pub fn candidates<'a>(
        &'a self,
        symbol: &'a str,
        logical: &'a str,
    ) -> impl Iterator<Item = Candidate<'a>> + 'a {
        let bucket = symbol.chars().next().and_then(|c| self.lengths.get(&c));

        let prefixed = bucket
            .into_iter()
            .flat_map(|bucket| bucket.iter())
            .filter(move |(prefix, _)| symbol.starts_with(prefix.as_str()))
            .flat_map(move |(prefix, &length)| {
                let relative = logical.get(length..).unwrap_or_default();
                self.dirs
                    .get(prefix)
                    .into_iter()
                    .flatten()
                    .map(move |dir| Candidate {
                        dir,
                        relative,
                        origin: CandidateOrigin::Prefix(prefix),
                    })
            });

        let fallback = self.fallback.iter().map(move |dir| Candidate {
            dir,
            relative: logical,
            origin: CandidateOrigin::Fallback,
        });

        prefixed.chain(fallback)
    }

    /// Registered prefixes that match `symbol`, in the order they are tried.
    pub fn matching_prefixes<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        symbol
            .chars()
            .next()
            .and_then(|c| self.lengths.get(&c))
            .into_iter()
            .flat_map(|bucket| bucket.keys())
            .map(String::as_str)
            .filter(move |prefix| symbol.starts_with(prefix))
    }

    /// Prefix -> directories, in registration order.
    #[must_use]
    pub fn prefixes(&self) -> &IndexMap<String, Vec<PathBuf>> {
        &self.dirs
    }

    #[must_use]
    pub fn fallback_dirs(&self) -> &[PathBuf] {
        &self.fallback
    }
}

/// PSR-0 prefix table.
#[derive(Debug, Clone, Default)]
pub struct LegacyPrefixTable {
    /// First character -> prefix -> directories, in registration order.
    prefixes: IndexMap<char, IndexMap<String, Vec<PathBuf>>>,
    fallback: Vec<PathBuf>,
}

impl LegacyPrefixTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register directories for `prefix`; the empty prefix targets the fallback list.
    ///
    /// Legacy prefixes are free-form (`Twig_`, `Symfony\Component`), so there
    /// is nothing to validate.
    pub fn register(&mut self, prefix: &str, dirs: Vec<PathBuf>, mode: RegisterMode) {
        let Some(first) = prefix.chars().next() else {
            merge_dirs(&mut self.fallback, dirs, mode);
            return;
        };

        let bucket = self.prefixes.entry(first).or_default();
        match bucket.get_mut(prefix) {
            Some(existing) => merge_dirs(existing, dirs, mode),
            None => {
                bucket.insert(prefix.to_string(), dirs);
            }
        }
    }

    /// Lazily yield `(directory, relative path)` pairs for `symbol`.
    ///
    /// `logical` must be [`psr0_logical_path`] of `symbol`; it is used
    /// unchanged for both prefix and fallback candidates.
    pub fn candidates<'a>(
        &'a self,
        symbol: &'a str,
        logical: &'a str,
    ) -> impl Iterator<Item = Candidate<'a>> + 'a {
        let bucket = symbol.chars().next().and_then(|c| self.prefixes.get(&c));

        let prefixed = bucket
            .into_iter()
            .flat_map(|bucket| bucket.iter())
            .filter(move |(prefix, _)| symbol.starts_with(prefix.as_str()))
            .flat_map(move |(prefix, dirs)| {
                dirs.iter().map(move |dir| Candidate {
                    dir,
                    relative: logical,
                    origin: CandidateOrigin::Prefix(prefix),
                })
            });

        let fallback = self.fallback.iter().map(move |dir| Candidate {
            dir,
            relative: logical,
            origin: CandidateOrigin::Fallback,
        });

        prefixed.chain(fallback)
    }

    /// Every prefix across all buckets, buckets in first-registration order.
    #[must_use]
    pub fn prefixes(&self) -> IndexMap<String, Vec<PathBuf>> {
        self.prefixes
            .values()
            .flat_map(|bucket| bucket.iter().map(|(p, d)| (p.clone(), d.clone())))
            .collect()
    }

    #[must_use]
    pub fn fallback_dirs(&self) -> &[PathBuf] {
        &self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_under_never_leaves_dir() {
        let dir = Path::new("/srv/app/src");
        let sep = MAIN_SEPARATOR_STR;

        assert_eq!(
            join_under(dir, &format!("Http{sep}Kernel.php")),
            dir.join("Http").join("Kernel.php")
        );
        // a leading separator in the relative part is kept under dir
        assert_eq!(
            join_under(dir, &format!("{sep}etc{sep}Evil.php")),
            dir.join("etc").join("Evil.php")
        );
        assert!(join_under(dir, &format!("{sep}Evil.php")).starts_with(dir));

        let with_trailing = PathBuf::from(format!("/srv/app/src{sep}"));
        assert_eq!(join_under(&with_trailing, "Foo.php"), dir.join("Foo.php"));
    }

    fn dirs(list: &[&str]) -> Vec<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    fn sep(path: &str) -> String {
        path.replace('/', MAIN_SEPARATOR_STR)
    }

    #[test]
    fn test_psr4_logical_path() {
        assert_eq!(
            psr4_logical_path("Foo\\Bar\\Baz", ".php"),
            sep("Foo/Bar/Baz.php")
        );
    }

    #[test]
    fn test_psr0_logical_path_pear_style() {
        let psr4 = psr4_logical_path("Foo_Bar_Baz", ".php");
        assert_eq!(
            psr0_logical_path("Foo_Bar_Baz", &psr4, ".php"),
            sep("Foo/Bar/Baz.php")
        );
    }

    #[test]
    fn test_psr0_logical_path_namespaced_only_class_segment() {
        let symbol = "My_NS\\Foo_Bar";
        let psr4 = psr4_logical_path(symbol, ".php");
        assert_eq!(
            psr0_logical_path(symbol, &psr4, ".php"),
            sep("My_NS/Foo/Bar.php")
        );
    }

    #[test]
    fn test_register_rejects_missing_separator() {
        let mut table = PrefixTable::new();
        let err = table
            .register("Foo", dirs(&["/a"]), RegisterMode::Append)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPrefix { ref prefix } if prefix == "Foo"));
        assert!(table.prefixes().is_empty());

        let err = table
            .register("Foo", dirs(&["/a"]), RegisterMode::Replace)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_register_prepend_and_append_order() {
        let mut table = PrefixTable::new();
        table
            .register("Foo\\", dirs(&["/a"]), RegisterMode::Append)
            .unwrap();
        table
            .register("Foo\\", dirs(&["/z"]), RegisterMode::Prepend)
            .unwrap();
        table
            .register("Foo\\", dirs(&["/m"]), RegisterMode::Append)
            .unwrap();

        assert_eq!(table.prefixes()["Foo\\"], dirs(&["/z", "/a", "/m"]));
    }

    #[test]
    fn test_register_replace() {
        let mut table = PrefixTable::new();
        table
            .register("Foo\\", dirs(&["/a", "/b"]), RegisterMode::Append)
            .unwrap();
        table
            .register("Foo\\", dirs(&["/c"]), RegisterMode::Replace)
            .unwrap();
        // replacing an unset prefix is a first registration
        table
            .register("Bar\\", dirs(&["/d"]), RegisterMode::Replace)
            .unwrap();

        assert_eq!(table.prefixes()["Foo\\"], dirs(&["/c"]));
        assert_eq!(table.prefixes()["Bar\\"], dirs(&["/d"]));
    }

    #[test]
    fn test_empty_prefix_targets_fallback() {
        let mut table = PrefixTable::new();
        table
            .register("", dirs(&["/a"]), RegisterMode::Append)
            .unwrap();
        table
            .register("", dirs(&["/z"]), RegisterMode::Prepend)
            .unwrap();
        assert_eq!(table.fallback_dirs(), dirs(&["/z", "/a"]).as_slice());
        assert!(table.prefixes().is_empty());

        table
            .register("", dirs(&["/only"]), RegisterMode::Replace)
            .unwrap();
        assert_eq!(table.fallback_dirs(), dirs(&["/only"]).as_slice());
    }

    #[test]
    fn test_candidates_slice_prefix_then_fallback() {
        let mut table = PrefixTable::new();
        table
            .register("Foo\\", dirs(&["/a", "/b"]), RegisterMode::Append)
            .unwrap();
        table
            .register("", dirs(&["/root"]), RegisterMode::Append)
            .unwrap();

        let symbol = "Foo\\Bar";
        let logical = psr4_logical_path(symbol, ".php");
        let found: Vec<(PathBuf, String)> = table
            .candidates(symbol, &logical)
            .map(|c| (c.dir.to_path_buf(), c.relative.to_string()))
            .collect();

        assert_eq!(
            found,
            vec![
                (PathBuf::from("/a"), "Bar.php".to_string()),
                (PathBuf::from("/b"), "Bar.php".to_string()),
                (PathBuf::from("/root"), sep("Foo/Bar.php")),
            ]
        );
    }

    #[test]
    fn test_candidates_first_registered_prefix_wins_over_longer() {
        let mut table = PrefixTable::new();
        table
            .register("Foo\\", dirs(&["/short"]), RegisterMode::Append)
            .unwrap();
        table
            .register("Foo\\Bar\\", dirs(&["/long"]), RegisterMode::Append)
            .unwrap();

        let symbol = "Foo\\Bar\\Baz";
        let logical = psr4_logical_path(symbol, ".php");
        let first = table.candidates(symbol, &logical).next().unwrap();

        assert_eq!(first.dir, Path::new("/short"));
        assert_eq!(first.origin, CandidateOrigin::Prefix("Foo\\"));
        assert_eq!(
            table.matching_prefixes(symbol).collect::<Vec<_>>(),
            vec!["Foo\\", "Foo\\Bar\\"]
        );
    }

    #[test]
    fn test_candidates_other_bucket_ignored() {
        let mut table = PrefixTable::new();
        table
            .register("Acme\\", dirs(&["/acme"]), RegisterMode::Append)
            .unwrap();

        let symbol = "Foo\\Bar";
        let logical = psr4_logical_path(symbol, ".php");
        assert_eq!(table.candidates(symbol, &logical).count(), 0);
    }

    #[test]
    fn test_legacy_candidates_use_transliterated_path() {
        let mut table = LegacyPrefixTable::new();
        table.register("Foo_", dirs(&["/lib"]), RegisterMode::Append);
        table.register("", dirs(&["/fallback"]), RegisterMode::Append);

        let symbol = "Foo_Bar_Baz";
        let psr4 = psr4_logical_path(symbol, ".php");
        let logical = psr0_logical_path(symbol, &psr4, ".php");
        let paths: Vec<PathBuf> = table
            .candidates(symbol, &logical)
            .map(|c| c.path())
            .collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("/lib").join(sep("Foo/Bar/Baz.php")),
                PathBuf::from("/fallback").join(sep("Foo/Bar/Baz.php")),
            ]
        );
    }

    #[test]
    fn test_legacy_prefixes_merged_across_buckets() {
        let mut table = LegacyPrefixTable::new();
        table.register("Twig_", dirs(&["/twig"]), RegisterMode::Append);
        table.register("Acme", dirs(&["/acme"]), RegisterMode::Append);
        table.register("Twig_", dirs(&["/twig2"]), RegisterMode::Prepend);

        let merged = table.prefixes();
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Twig_", "Acme"]);
        assert_eq!(merged["Twig_"], dirs(&["/twig2", "/twig"]));
    }

    #[test]
    fn test_register_mode_from_prepend() {
        assert_eq!(RegisterMode::from_prepend(true), RegisterMode::Prepend);
        assert_eq!(RegisterMode::from_prepend(false), RegisterMode::Append);
    }
}
