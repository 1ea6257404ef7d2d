//! Class map generation.
//!
//! Scans PHP sources for `namespace` and `class` / `interface` / `trait` /
//! `enum` declarations without full parsing, producing the symbol -> file
//! table the loader consults first.

use crate::error::Error;
use autoload_util::fs::read_source_lossy;
use autoload_util::walk::source_files;
use indexmap::IndexMap;
use rayon::prelude::*;
use regex_lite::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File extensions scanned for declarations (without the dot).
pub const SOURCE_EXTENSIONS: &[&str] = &["php", "inc", "hh"];

/// Identifiers that can follow `class` without naming a class (`new class extends X`).
const NOT_A_NAME: &[&str] = &["extends", "implements"];

fn declaration_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?:^|[^\w$:>\\])",
            r"(?:",
            r"(namespace)(?:\s+([A-Za-z_][\w\\]*))?",
            r"|",
            r"(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s+([A-Za-z_]\w*)",
            r")",
        ))
        .ok()
    })
    .as_ref()
}

/// Blank out comments, string literals, heredocs and inline HTML.
///
/// Newlines are kept so offsets stay line-aligned; everything removed
/// becomes a space, which can never form part of a declaration.
fn strip_non_code(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut in_php = false;

    let blank = |out: &mut String, c: char| out.push(if c == '\n' { '\n' } else { ' ' });

    while i < len {
        let c = chars[i];

        if !in_php {
            if c == '<' && i + 1 < len && chars[i + 1] == '?' {
                in_php = true;
                out.push_str("  ");
                i += 2;
                continue;
            }
            blank(&mut out, c);
            i += 1;
            continue;
        }

        // Closing tag
        if c == '?' && i + 1 < len && chars[i + 1] == '>' {
            in_php = false;
            out.push_str("  ");
            i += 2;
            continue;
        }

        // Line comments: `//` and `#`, but not `#[` attributes
        if (c == '/' && i + 1 < len && chars[i + 1] == '/')
            || (c == '#' && !(i + 1 < len && chars[i + 1] == '['))
        {
            while i < len && chars[i] != '\n' {
                blank(&mut out, chars[i]);
                i += 1;
            }
            continue;
        }

        // Block comments
        if c == '/' && i + 1 < len && chars[i + 1] == '*' {
            out.push_str("  ");
            i += 2;
            while i < len && !(chars[i] == '*' && i + 1 < len && chars[i + 1] == '/') {
                blank(&mut out, chars[i]);
                i += 1;
            }
            if i < len {
                out.push_str("  ");
                i += 2;
            }
            continue;
        }

        // Quoted strings
        if c == '\'' || c == '"' {
            blank(&mut out, c);
            i += 1;
            while i < len && chars[i] != c {
                if chars[i] == '\\' && i + 1 < len {
                    blank(&mut out, chars[i]);
                    i += 1;
                }
                blank(&mut out, chars[i]);
                i += 1;
            }
            if i < len {
                blank(&mut out, chars[i]);
                i += 1;
            }
            continue;
        }

        // Heredoc / nowdoc: <<<ID, <<<"ID", <<<'ID'
        if c == '<' && chars[i..].starts_with(&['<', '<', '<']) {
            let mut j = i + 3;
            while j < len && (chars[j] == ' ' || chars[j] == '"' || chars[j] == '\'') {
                j += 1;
            }
            let start = j;
            while j < len && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let label: String = chars[start..j].iter().collect();
            if !label.is_empty() {
                // Skip to the line whose first non-blank text is the label.
                let mut line_start = false;
                while i < len {
                    if line_start {
                        let mut k = i;
                        while k < len && (chars[k] == ' ' || chars[k] == '\t') {
                            k += 1;
                        }
                        let rest: String = chars[k..len.min(k + label.len())].iter().collect();
                        if rest == label {
                            while i < k + label.len() {
                                blank(&mut out, chars[i]);
                                i += 1;
                            }
                            break;
                        }
                    }
                    line_start = chars[i] == '\n';
                    blank(&mut out, chars[i]);
                    i += 1;
                }
                continue;
            }
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Scan PHP source for fully-qualified symbols it declares, in order.
#[must_use]
pub fn scan_symbols(source: &str) -> Vec<String> {
    let Some(re) = declaration_regex() else {
        return Vec::new();
    };
    let code = strip_non_code(source);
    let mut namespace = String::new();
    let mut symbols = Vec::new();

    for caps in re.captures_iter(&code) {
        if let Some(keyword) = caps.get(1) {
            // Only `namespace Name;`, `namespace Name {` and `namespace {` declare;
            // `namespace\foo()` is a relative name.
            let rest = code[keyword.end()..].trim_start();
            let rest = match caps.get(2) {
                Some(name) => code[name.end()..].trim_start(),
                None => rest,
            };
            if rest.starts_with(';') || rest.starts_with('{') {
                namespace = caps
                    .get(2)
                    .map(|m| m.as_str().trim_matches('\\').to_string())
                    .unwrap_or_default();
            }
        } else if let Some(name) = caps.get(3) {
            let name = name.as_str();
            if NOT_A_NAME.iter().any(|kw| kw.eq_ignore_ascii_case(name)) {
                continue;
            }
            // `new class` never declares a name
            let before = code[..caps.get(0).map_or(0, |m| m.start())].trim_end();
            if before.ends_with("new") {
                continue;
            }
            let symbol = if namespace.is_empty() {
                name.to_string()
            } else {
                format!("{namespace}\\{name}")
            };
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
    }

    symbols
}

/// A symbol declared in more than one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSymbol {
    pub symbol: String,
    /// File that stays in the map.
    pub kept: PathBuf,
    /// File whose declaration was dropped.
    pub ignored: PathBuf,
}

/// Generated class map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassMap {
    pub entries: IndexMap<String, PathBuf>,
    pub duplicates: Vec<DuplicateSymbol>,
}

fn compile_excludes(excludes: &[String]) -> Result<Vec<glob::Pattern>, Error> {
    excludes
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|source| Error::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn is_excluded(path: &Path, base: &Path, patterns: &[glob::Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let rel = path
        .strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");
    patterns.iter().any(|p| p.matches(&rel))
}

/// Walk `dirs` (in order) and build a class map.
///
/// `excludes` are glob patterns matched against paths relative to `base`
/// with `/` separators. Within a directory files are visited in sorted
/// order; the first declaration of a symbol wins and later ones are
/// reported in [`ClassMap::duplicates`]. Unreadable files are skipped.
///
/// # Errors
/// Returns [`Error::InvalidPattern`] for a malformed exclude pattern.
pub fn generate(dirs: &[PathBuf], excludes: &[String], base: &Path) -> Result<ClassMap, Error> {
    let patterns = compile_excludes(excludes)?;

    let mut files: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        for file in source_files(dir, SOURCE_EXTENSIONS) {
            if !is_excluded(&file, base, &patterns) && !files.contains(&file) {
                files.push(file);
            }
        }
    }

    let scanned: Vec<(PathBuf, Vec<String>)> = files
        .into_par_iter()
        .map(|file| {
            let symbols = match read_source_lossy(&file) {
                Ok(source) => scan_symbols(&source),
                Err(err) => {
                    tracing::warn!(path = %file.display(), error = %err, "skipping unreadable source");
                    Vec::new()
                }
            };
            (file, symbols)
        })
        .collect();

    let mut map = ClassMap::default();
    for (file, symbols) in scanned {
        for symbol in symbols {
            match map.entries.get(&symbol) {
                Some(kept) => map.duplicates.push(DuplicateSymbol {
                    symbol,
                    kept: kept.clone(),
                    ignored: file.clone(),
                }),
                None => {
                    map.entries.insert(symbol, file.clone());
                }
            }
        }
    }

    tracing::debug!(
        symbols = map.entries.len(),
        duplicates = map.duplicates.len(),
        "generated class map"
    );
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_namespaced_class() {
        let src = "<?php\nnamespace App\\Service;\n\nfinal class Mailer extends Base {}\n";
        assert_eq!(scan_symbols(src), vec!["App\\Service\\Mailer"]);
    }

    #[test]
    fn test_scan_all_declaration_kinds() {
        let src = r"<?php
namespace Shapes;
interface Shape {}
trait Named {}
abstract class Polygon implements Shape {}
enum Kind: string { case A = 'a'; }
readonly class Point {}
";
        assert_eq!(
            scan_symbols(src),
            vec![
                "Shapes\\Shape",
                "Shapes\\Named",
                "Shapes\\Polygon",
                "Shapes\\Kind",
                "Shapes\\Point",
            ]
        );
    }

    #[test]
    fn test_scan_global_namespace_and_pear() {
        let src = "<?php class Twig_Environment {}";
        assert_eq!(scan_symbols(src), vec!["Twig_Environment"]);
    }

    #[test]
    fn test_scan_multiple_namespace_blocks() {
        let src = r"<?php
namespace A { class One {} }
namespace B { class Two {} }
namespace { class Three {} }
";
        assert_eq!(scan_symbols(src), vec!["A\\One", "B\\Two", "Three"]);
    }

    #[test]
    fn test_scan_ignores_comments_strings_and_anonymous() {
        let src = r#"<?php
// class Commented {}
/* class Blocked {} */
# class Hashed {}
$s = "class Quoted {}";
$t = 'class Single {}';
$o = new class extends Base {};
$n = Foo::class;
class Real {}
"#;
        assert_eq!(scan_symbols(src), vec!["Real"]);
    }

    #[test]
    fn test_scan_ignores_heredoc_and_inline_html() {
        let src = "<html>class Html {}</html>\n<?php\n$x = <<<EOT\nclass Doc {}\nEOT;\nclass Kept {}\n";
        assert_eq!(scan_symbols(src), vec!["Kept"]);
    }

    #[test]
    fn test_scan_compact_and_relative_namespace() {
        let src = "<?php namespace App;class Tight{}\n$x = namespace\\helper();\nclass After {}";
        assert_eq!(scan_symbols(src), vec!["App\\Tight", "App\\After"]);
    }

    #[test]
    fn test_scan_keeps_attributes() {
        let src = "<?php\nnamespace App;\n#[Attribute]\nclass Marker {}\n";
        assert_eq!(scan_symbols(src), vec!["App\\Marker"]);
    }

    #[test]
    fn test_generate_first_wins_and_reports_duplicates() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("Dup.php"), "<?php namespace X; class Dup {}").unwrap();
        fs::write(b.join("Dup.php"), "<?php namespace X; class Dup {}").unwrap();
        fs::write(b.join("Other.php"), "<?php namespace X; class Other {}").unwrap();

        let map = generate(&[a.clone(), b.clone()], &[], dir.path()).unwrap();

        assert_eq!(map.entries["X\\Dup"], a.join("Dup.php"));
        assert_eq!(map.entries["X\\Other"], b.join("Other.php"));
        assert_eq!(map.duplicates.len(), 1);
        assert_eq!(map.duplicates[0].ignored, b.join("Dup.php"));
    }

    #[test]
    fn test_generate_excludes() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("Tests")).unwrap();
        fs::write(src.join("Keep.php"), "<?php class Keep {}").unwrap();
        fs::write(src.join("Tests/KeepTest.php"), "<?php class KeepTest {}").unwrap();

        let map = generate(&[src], &["src/Tests/*".to_string()], dir.path()).unwrap();

        assert!(map.entries.contains_key("Keep"));
        assert!(!map.entries.contains_key("KeepTest"));
    }

    #[test]
    fn test_generate_invalid_pattern() {
        let dir = tempdir().unwrap();
        let err = generate(&[dir.path().to_path_buf()], &["[".to_string()], dir.path())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
