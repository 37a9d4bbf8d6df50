//! Atomic, content-stable file writes.
//!
//! Every artifact write compares against the existing file's bytes
//! first; a write only happens when content actually differs, and even
//! then goes through a temp-file-then-rename so a crash mid-write never
//! leaves a half-written artifact behind.

use std::fs;
use std::io;
use std::path::Path;

/// Write `contents` to `path` only if the existing file (if any) has
/// different bytes. Returns whether a write occurred.
pub fn write_if_changed(path: &Path, contents: &[u8]) -> io::Result<bool> {
    if let Ok(existing) = fs::read(path) {
        if existing == contents {
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(true)
}

fn tmp_path(path: &Path) -> std::path::PathBuf {
    let file_name = path
        .file_name()
        .map(|n| format!(".{}.tmp", n.to_string_lossy()))
        .unwrap_or_else(|| ".skelly.tmp".to_string());
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_when_absent_and_skips_when_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        assert!(write_if_changed(&path, b"hello").unwrap());
        assert!(!write_if_changed(&path, b"hello").unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn rewrites_when_content_differs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        write_if_changed(&path, b"v1").unwrap();
        assert!(write_if_changed(&path, b"v2").unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"v2");
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/a.txt");
        assert!(write_if_changed(&path, b"x").unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"x");
    }
}
