use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::StoreError;

/// Writes `contents` to `path` via write-temp-then-rename, so a process
/// interrupted mid-write leaves either the old file or the new one, never a
/// truncated one (spec.md §4.C).
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| StoreError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    tmp.write_all(contents).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tmp.persist(path)
        .map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e.error,
        })?;
    Ok(())
}

pub fn read_to_string(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}
