use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::StoreError;

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Collects every file and directory under `root`, recursively, in no
/// particular order.
fn walk(root: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).map_err(|e| io_err(&dir, e))? {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path.clone());
            }
            out.push(path);
        }
    }
    Ok(out)
}

/// Packs every file under `root` into a zip archive at `dest`, using
/// forward-slash relative paths as zip entry names regardless of platform.
pub fn zip_directory(root: &Path, dest: &Path) -> Result<(), StoreError> {
    let file = File::create(dest).map_err(|e| io_err(dest, e))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().unix_permissions(0o644);

    for entry in walk(root)? {
        let relative = entry
            .strip_prefix(root)
            .expect("walked entry is under root")
            .to_string_lossy()
            .replace('\\', "/");

        if entry.is_dir() {
            writer
                .add_directory(format!("{relative}/"), options)
                .map_err(StoreError::from)?;
            continue;
        }

        writer
            .start_file(relative, options)
            .map_err(StoreError::from)?;
        let mut contents = Vec::new();
        File::open(&entry)
            .and_then(|mut f| f.read_to_end(&mut contents))
            .map_err(|e| io_err(&entry, e))?;
        writer.write_all(&contents).map_err(|e| io_err(&entry, e))?;
    }

    writer.finish().map_err(StoreError::from)?;
    Ok(())
}

/// Extracts `src` (a zip archive) into a freshly created directory tree
/// rooted at `dest`.
pub fn unzip_to(src: &Path, dest: &Path) -> Result<(), StoreError> {
    let file = File::open(src).map_err(|e| io_err(src, e))?;
    let mut archive = ZipArchive::new(file).map_err(StoreError::from)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(StoreError::from)?;
        let out_path = dest.join(entry.mangled_name());

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| io_err(&out_path, e))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut out_file = File::create(&out_path).map_err(|e| io_err(&out_path, e))?;
        std::io::copy(&mut entry, &mut out_file).map_err(|e| io_err(&out_path, e))?;
    }
    Ok(())
}
