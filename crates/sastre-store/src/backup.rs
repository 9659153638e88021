use std::fs;
use std::path::Path;

use crate::error::StoreError;

/// Rolls an existing `path` aside before a fresh write session begins
/// (spec.md §4.C): renames it to `<path>_N` for the smallest free `N` in
/// 1..=99, deleting the oldest numbered sibling first if 99 is already
/// taken. No-op if `path` doesn't exist.
pub fn roll_backups(path: &Path) -> Result<(), StoreError> {
    if !path.exists() {
        return Ok(());
    }

    let mut free_slot = None;
    for n in 1..=99 {
        let candidate = backup_path(path, n);
        if !candidate.exists() {
            free_slot = Some(n);
            break;
        }
    }

    let slot = match free_slot {
        Some(n) => n,
        None => {
            // Ring buffer: slot 1 was filled first and is the oldest backup
            // standing. Free it and reuse it for the new one.
            remove(&backup_path(path, 1))?;
            1
        }
    };

    rename(path, &backup_path(path, slot))
}

fn backup_path(path: &Path, n: u32) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!("_{n}"));
    std::path::PathBuf::from(name)
}

fn rename(from: &Path, to: &Path) -> Result<(), StoreError> {
    fs::rename(from, to).map_err(|source| StoreError::Io {
        path: from.display().to_string(),
        source,
    })
}

fn remove(path: &Path) -> Result<(), StoreError> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
    .map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn first_backup_gets_suffix_one() {
        let dir = tempdir().unwrap();
        let workdir = dir.path().join("backup1");
        fs::create_dir(&workdir).unwrap();

        roll_backups(&workdir).unwrap();

        assert!(!workdir.exists());
        assert!(backup_path(&workdir, 1).exists());
    }

    #[test]
    fn missing_path_is_a_no_op() {
        let dir = tempdir().unwrap();
        let workdir = dir.path().join("does-not-exist");
        roll_backups(&workdir).unwrap();
    }

    #[test]
    fn second_roll_takes_the_next_free_slot() {
        let dir = tempdir().unwrap();
        let workdir = dir.path().join("backup2");
        fs::create_dir(&workdir).unwrap();
        roll_backups(&workdir).unwrap();

        fs::create_dir(&workdir).unwrap();
        roll_backups(&workdir).unwrap();

        assert!(backup_path(&workdir, 1).exists());
        assert!(backup_path(&workdir, 2).exists());
    }
}
