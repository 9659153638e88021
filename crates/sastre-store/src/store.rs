use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use sastre_model::{canonicalize, Attachment, Id, Index, Kind};

use crate::archive::{unzip_to, zip_directory};
use crate::backup::roll_backups;
use crate::error::StoreError;
use crate::layout::{
    attached_suffix, values_suffix, CERTIFICATES_DIR, DEVICE_CONFIGS_DIR, INDEX_FILE,
    SERVER_INFO_FILE, WAN_EDGE_LIST_FILE,
};
use crate::safe_name::NameLedger;
use crate::writer::{read_to_string, write_atomic};

enum Backing {
    Directory,
    /// Writes land in a scratch directory and get zipped into `final_path`
    /// on `finish`. Reads of an archive are unzipped into the scratch
    /// directory up front and never written back.
    Archive {
        _scratch: TempDir,
        final_path: PathBuf,
    },
}

/// A backup's on-disk layout, abstracting over a plain directory and a zip
/// archive (spec.md §4.C). All paths are relative to an internal root,
/// which is either the real workdir or a scratch directory backing an
/// archive.
pub struct Store {
    root: PathBuf,
    backing: Backing,
    ledgers: HashMap<Kind, NameLedger>,
}

impl Store {
    /// Opens `path` for a fresh write session: rolls any existing
    /// `path`/`path.zip` aside per the rolling-backup rule, then creates an
    /// empty tree (or scratch directory, for archive mode) to write into.
    pub fn create(path: &Path, as_archive: bool) -> Result<Self, StoreError> {
        roll_backups(path)?;

        if as_archive {
            let scratch = tempfile::tempdir().map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let root = scratch.path().to_path_buf();
            Ok(Store {
                root,
                backing: Backing::Archive {
                    _scratch: scratch,
                    final_path: path.to_path_buf(),
                },
                ledgers: HashMap::new(),
            })
        } else {
            fs::create_dir_all(path).map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Ok(Store {
                root: path.to_path_buf(),
                backing: Backing::Directory,
                ledgers: HashMap::new(),
            })
        }
    }

    /// Opens `path` for reading. A plain file is treated as a zip archive
    /// and extracted into a scratch directory; a directory is read in
    /// place.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if path.is_file() {
            let scratch = tempfile::tempdir().map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
            unzip_to(path, scratch.path())?;
            let root = scratch.path().to_path_buf();
            Ok(Store {
                root,
                backing: Backing::Archive {
                    _scratch: scratch,
                    final_path: path.to_path_buf(),
                },
                ledgers: HashMap::new(),
            })
        } else if path.is_dir() {
            Ok(Store {
                root: path.to_path_buf(),
                backing: Backing::Directory,
                ledgers: HashMap::new(),
            })
        } else {
            Err(StoreError::NotADirectory {
                path: path.display().to_string(),
            })
        }
    }

    /// Finalizes a write session. For archive mode, zips the scratch
    /// directory into the final path; for directory mode, a no-op (writes
    /// already landed on disk).
    pub fn finish(self) -> Result<(), StoreError> {
        match self.backing {
            Backing::Directory => Ok(()),
            Backing::Archive { final_path, .. } => zip_directory(&self.root, &final_path),
        }
    }

    fn kind_dir(&self, kind: &Kind) -> PathBuf {
        self.root.join(kind.as_str())
    }

    fn write_json(&self, path: &Path, value: &Value) -> Result<(), StoreError> {
        write_atomic(path, canonicalize(value).as_bytes()).map_err(|e| match e {
            StoreError::Io { source, .. } => StoreError::Io {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<T, StoreError> {
        let text = read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn write_server_info(&self, info: &Value) -> Result<(), StoreError> {
        self.write_json(&self.root.join(SERVER_INFO_FILE), info)
    }

    pub fn read_server_info(&self) -> Result<Value, StoreError> {
        self.read_json(&self.root.join(SERVER_INFO_FILE))
    }

    pub fn write_index(&self, kind: &Kind, index: &Index) -> Result<(), StoreError> {
        let value = serde_json::to_value(index).expect("Index serializes");
        self.write_json(&self.kind_dir(kind).join(INDEX_FILE), &value)
    }

    pub fn read_index(&self, kind: &Kind) -> Result<Index, StoreError> {
        self.read_json(&self.kind_dir(kind).join(INDEX_FILE))
    }

    /// Writes an item body, resolving a collision-safe filename from
    /// `(name, id)`. Returns the stem used (without `.json`), so callers
    /// can derive the sibling `_attached.json`/`_values.json` paths.
    pub fn write_item(
        &mut self,
        kind: &Kind,
        id: &Id,
        name: &str,
        body: &Value,
    ) -> Result<String, StoreError> {
        let stem = self
            .ledgers
            .entry(kind.clone())
            .or_default()
            .resolve(name, id);
        let path = self.kind_dir(kind).join(format!("{stem}.json"));
        self.write_json(&path, body)?;
        Ok(stem)
    }

    pub fn read_item(&self, kind: &Kind, stem: &str) -> Result<Value, StoreError> {
        self.read_json(&self.kind_dir(kind).join(format!("{stem}.json")))
    }

    /// Resolves the on-disk stem for `(id, name)` the way a reader must,
    /// without the write-time `NameLedger`: try the plain safe-name first,
    /// then the `<safe-name>_<id>` collision-fallback form (spec.md §3,
    /// "readers accept either form").
    pub fn stem_for(&self, kind: &Kind, id: &Id, name: &str) -> String {
        let base = crate::safe_name::safe_filename(name);
        if self.kind_dir(kind).join(format!("{base}.json")).is_file() {
            base
        } else {
            format!("{base}_{}", crate::safe_name::safe_filename(id.as_str()))
        }
    }

    pub fn read_item_by_identity(&self, kind: &Kind, id: &Id, name: &str) -> Result<Value, StoreError> {
        self.read_item(kind, &self.stem_for(kind, id, name))
    }

    pub fn read_attachments_by_identity(&self, kind: &Kind, id: &Id, name: &str) -> Result<Vec<Attachment>, StoreError> {
        self.read_attachments(kind, &self.stem_for(kind, id, name))
    }

    pub fn read_values_by_identity(
        &self,
        kind: &Kind,
        id: &Id,
        name: &str,
    ) -> Result<BTreeMap<String, BTreeMap<String, String>>, StoreError> {
        self.read_values(kind, &self.stem_for(kind, id, name))
    }

    /// Writes every device attached to one device template (spec.md §3
    /// "Attachment"). A device template can have many attached devices, so
    /// `<safe-name>_attached.json` holds the whole list, not one record.
    pub fn write_attachments(
        &self,
        kind: &Kind,
        stem: &str,
        attachments: &[Attachment],
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(attachments).expect("Vec<Attachment> serializes");
        self.write_json(&self.attached_path(kind, stem), &value)
    }

    pub fn read_attachments(&self, kind: &Kind, stem: &str) -> Result<Vec<Attachment>, StoreError> {
        self.read_json(&self.attached_path(kind, stem))
    }

    /// Writes every attached device's variable values, keyed by device id,
    /// for one device template.
    pub fn write_values(
        &self,
        kind: &Kind,
        stem: &str,
        values: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(values).expect("nested BTreeMap serializes");
        self.write_json(&self.values_path(kind, stem), &value)
    }

    pub fn read_values(
        &self,
        kind: &Kind,
        stem: &str,
    ) -> Result<BTreeMap<String, BTreeMap<String, String>>, StoreError> {
        self.read_json(&self.values_path(kind, stem))
    }

    fn attached_path(&self, kind: &Kind, stem: &str) -> PathBuf {
        self.kind_dir(kind).join(format!("{stem}{}.json", attached_suffix()))
    }

    fn values_path(&self, kind: &Kind, stem: &str) -> PathBuf {
        self.kind_dir(kind).join(format!("{stem}{}.json", values_suffix()))
    }

    pub fn write_certificates_index(&self, certs: &Value) -> Result<(), StoreError> {
        self.write_json(
            &self.root.join(CERTIFICATES_DIR).join(WAN_EDGE_LIST_FILE),
            certs,
        )
    }

    pub fn read_certificates_index(&self) -> Result<Value, StoreError> {
        self.read_json(&self.root.join(CERTIFICATES_DIR).join(WAN_EDGE_LIST_FILE))
    }

    pub fn write_device_config(&self, hostname: &str, config: &str) -> Result<(), StoreError> {
        let path = self.root.join(DEVICE_CONFIGS_DIR).join(format!("{hostname}.cfg"));
        write_atomic(&path, config.as_bytes())
    }

    pub fn read_device_config(&self, hostname: &str) -> Result<String, StoreError> {
        read_to_string(&self.root.join(DEVICE_CONFIGS_DIR).join(format!("{hostname}.cfg")))
    }

    /// Kind directories present under this store's root, in directory-listing
    /// order. Callers needing a deterministic order should sort the result
    /// or, better, drive iteration from the catalog/graph instead.
    pub fn list_kinds(&self) -> Result<Vec<Kind>, StoreError> {
        let mut out = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            path: self.root.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.display().to_string(),
                source,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == CERTIFICATES_DIR || name == DEVICE_CONFIGS_DIR {
                continue;
            }
            out.push(Kind::new(name));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sastre_model::Item;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_item_and_index_round_trip() {
        let dir = tempdir().unwrap();
        let workdir = dir.path().join("backup");
        let mut store = Store::create(&workdir, false).unwrap();

        let kind = Kind::new("template_device");
        let item = Item::new(kind.clone(), Id::new("1"), "DC1", serde_json::json!({"a": 1}));
        let stem = store.write_item(&kind, &item.id, &item.name, &item.body).unwrap();
        assert_eq!(stem, "DC1");

        let read_back = store.read_item(&kind, &stem).unwrap();
        assert_eq!(read_back, serde_json::json!({"a": 1}));
    }

    #[test]
    fn archive_round_trips_through_zip() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("backup.zip");

        let mut store = Store::create(&archive_path, true).unwrap();
        let kind = Kind::new("policy_list.site");
        store.write_item(&kind, &Id::new("1"), "US-EAST", &serde_json::json!({"x": true})).unwrap();
        store.finish().unwrap();

        assert!(archive_path.is_file());

        let reopened = Store::open(&archive_path).unwrap();
        let body = reopened.read_item(&kind, "US-EAST").unwrap();
        assert_eq!(body, serde_json::json!({"x": true}));
    }

    #[test]
    fn colliding_names_get_distinct_files() {
        let dir = tempdir().unwrap();
        let mut store = Store::create(&dir.path().join("backup"), false).unwrap();
        let kind = Kind::new("policy_list.site");

        let stem_a = store.write_item(&kind, &Id::new("1"), "SITE", &serde_json::json!({})).unwrap();
        let stem_b = store.write_item(&kind, &Id::new("2"), "SITE", &serde_json::json!({})).unwrap();
        assert_ne!(stem_a, stem_b);
    }
}
