use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Read a source file as text, replacing invalid UTF-8 with the replacement character.
///
/// PHP sources in the wild are not always valid UTF-8 (latin-1 comments, binary
/// heredocs), and declaration scanning only needs the ASCII structure.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_source_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

/// Sibling temp path used by [`write_atomic`].
fn temp_sibling(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("out");
    parent.join(format!(".{name}.tmp.{}", std::process::id()))
}

/// Write bytes to `path` through a temp file in the same directory and a rename.
///
/// Readers see either the previous contents or the new ones, never a torn file.
///
/// # Errors
/// Returns an error if the temp file cannot be written or renamed into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp = temp_sibling(path);

    {
        let mut file = File::create(&temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    if let Err(err) = fs::rename(&temp, path) {
        // Windows refuses to rename over an existing file.
        if cfg!(windows) && path.exists() {
            let copied = fs::copy(&temp, path).map(|_| ());
            let _ = fs::remove_file(&temp);
            return copied;
        }
        let _ = fs::remove_file(&temp);
        return Err(err);
    }

    Ok(())
}
