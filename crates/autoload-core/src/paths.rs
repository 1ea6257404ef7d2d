use crate::error::Error;
use std::path::{Path, PathBuf};

/// Dedicated manifest file name; preferred over `composer.json`.
pub const AUTOLOAD_MANIFEST: &str = "autoload.json";

/// Composer-style project file, read for its `autoload` sections.
pub const COMPOSER_MANIFEST: &str = "composer.json";

/// Environment variable holding the include path (platform path-list syntax).
pub const INCLUDE_PATH_ENV: &str = "AUTOLOAD_INCLUDE_PATH";

/// Find the project root by walking up from `cwd` looking for a manifest.
///
/// Returns the first directory containing `autoload.json` or `composer.json`,
/// or `None` if neither is found.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join(AUTOLOAD_MANIFEST).is_file() || current.join(COMPOSER_MANIFEST).is_file()
        {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Pick the manifest inside a project root, preferring `autoload.json`.
#[must_use]
pub fn manifest_in(root: &Path) -> Option<PathBuf> {
    [AUTOLOAD_MANIFEST, COMPOSER_MANIFEST]
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

/// Locate the manifest for `cwd`: walk up to the project root, then pick its manifest.
///
/// # Errors
/// Returns [`Error::ProjectNotFound`] if no ancestor holds a manifest.
pub fn find_manifest(cwd: &Path) -> Result<PathBuf, Error> {
    project_root(cwd)
        .and_then(|root| manifest_in(&root))
        .ok_or_else(|| Error::ProjectNotFound {
            start: cwd.to_path_buf(),
        })
}

/// Resolve `dir` against `base` unless it is already absolute.
///
/// The result is not canonicalized; registered directories are probed as given.
#[must_use]
pub fn resolve_dir(base: &Path, dir: &str) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_project_root_with_composer_json() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("src").join("App");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("composer.json"), "{}").unwrap();

        assert_eq!(project_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_project_root_with_autoload_json() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("lib");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("autoload.json"), "{}").unwrap();

        assert_eq!(project_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_manifest_in_prefers_autoload_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("composer.json"), "{}").unwrap();
        fs::write(dir.path().join("autoload.json"), "{}").unwrap();

        assert_eq!(
            manifest_in(dir.path()),
            Some(dir.path().join("autoload.json"))
        );
    }

    #[test]
    fn test_find_manifest_composer_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("composer.json"), "{}").unwrap();

        let found = find_manifest(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("composer.json"));
    }

    #[test]
    fn test_resolve_dir_relative_and_absolute() {
        let base = Path::new("/proj");
        assert_eq!(resolve_dir(base, "src/"), PathBuf::from("/proj/src/"));

        let abs = std::env::temp_dir();
        let abs_str = abs.to_string_lossy().into_owned();
        assert_eq!(resolve_dir(base, &abs_str), abs);
    }
}
