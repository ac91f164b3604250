//! File helpers shared by the key store and the save record.
//!
//! Writes go to a sibling temp file which is synced and renamed over the
//! target, so a crash mid-write leaves either the old file or the new one.
//! The directory is synced after the rename so the new entry itself survives
//! a crash.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Read a whole file, treating "not found" as `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::StorageReadError(format!(
            "{}: {}",
            path.display(),
            e
        ))),
    }
}

/// Replace `path` with `contents` atomically.
///
/// With `owner_only` set, the file is created `0600` on Unix.
pub(crate) fn write_atomic(path: &Path, contents: &[u8], owner_only: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }
    }

    let tmp_path = temp_path(path);
    let result = write_synced(&tmp_path, contents, owner_only)
        .and_then(|_| fs::rename(&tmp_path, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(write_error(path, e));
    }

    sync_parent(path).map_err(|e| write_error(path, e))
}

/// Delete a file, returning whether it existed.
pub(crate) fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(write_error(path, e)),
    }
}

fn write_synced(path: &Path, contents: &[u8], owner_only: bool) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if owner_only {
            options.mode(0o600); // rw------- (owner only)
        }
    }
    #[cfg(not(unix))]
    let _ = owner_only;

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Flush the directory entry for `path` to disk.
#[cfg(unix)]
fn sync_parent(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::File::open(parent)?.sync_all()
}

// Directories cannot be opened as files here; rename durability is left to
// the filesystem.
#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_error(path: &Path, err: std::io::Error) -> Error {
    Error::StorageWriteError(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_optional(&dir.path().join("absent")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.sav");

        write_atomic(&path, b"first", false).unwrap();
        write_atomic(&path, b"second", false).unwrap();

        assert_eq!(read_optional(&path).unwrap().unwrap(), b"second");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_sync_parent_accepts_written_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rsa_key.json");
        write_atomic(&path, b"{}", true).unwrap();

        sync_parent(&path).unwrap();
        sync_parent(Path::new("relative.sav")).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.json");
        write_atomic(&path, b"{}", true).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_remove_if_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file");

        assert!(!remove_if_exists(&path).unwrap());
        write_atomic(&path, b"x", false).unwrap();
        assert!(remove_if_exists(&path).unwrap());
        assert!(!path.exists());
    }
}
