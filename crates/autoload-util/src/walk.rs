use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never descended into when collecting sources.
const SKIPPED_DIRS: &[&str] = &[".git", ".svn", ".hg", "node_modules"];

/// Collect files under `root` whose extension is one of `extensions`.
///
/// Extensions are given without the leading dot (`"php"`). Symlinks are not
/// followed and unreadable entries are skipped. The result is sorted so that
/// callers building "first wins" tables get a deterministic order.
///
/// A `root` that is itself a matching file is returned as the only entry.
#[must_use]
pub fn source_files(root: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !SKIPPED_DIRS.contains(&e.file_name().to_string_lossy().as_ref())
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| has_extension(p, extensions))
        .collect();

    files.sort();
    files
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_source_files_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/Sub")).unwrap();
        fs::write(dir.path().join("src/B.php"), "").unwrap();
        fs::write(dir.path().join("src/Sub/A.php"), "").unwrap();
        fs::write(dir.path().join("src/readme.md"), "").unwrap();
        fs::write(dir.path().join("src/legacy.inc"), "").unwrap();

        let files = source_files(dir.path(), &["php", "inc"]);
        let rel: Vec<String> = files
            .iter()
            .map(|p| {
                p.strip_prefix(dir.path())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(rel, vec!["src/B.php", "src/Sub/A.php", "src/legacy.inc"]);
    }

    #[test]
    fn test_source_files_skips_vcs_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/hook.php"), "").unwrap();
        fs::write(dir.path().join("Keep.php"), "").unwrap();

        let files = source_files(dir.path(), &["php"]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Keep.php"));
    }

    #[test]
    fn test_source_files_single_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("One.PHP");
        fs::write(&file, "").unwrap();

        assert_eq!(source_files(&file, &["php"]), vec![file]);
    }

    #[test]
    fn test_source_files_missing_root() {
        let dir = tempdir().unwrap();
        assert!(source_files(&dir.path().join("absent"), &["php"]).is_empty());
    }
}
