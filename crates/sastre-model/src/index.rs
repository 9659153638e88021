use crate::Id;
use serde::{Deserialize, Serialize};

/// One row of a per-kind index, as persisted by a controller (and mirrored
/// into the store). `omitted` is set by Backup (spec.md §4.E.1 step 6, and
/// SPEC_FULL.md §11) when the per-item GET failed and the entry is a
/// placeholder summary rather than evidence of a fetched body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    pub id: Id,
    pub name: String,
    pub factory_default: bool,
    pub version: Option<String>,
    #[serde(default)]
    pub omitted: bool,
}

/// A per-kind index: the list of item summaries under a well-known
/// controller endpoint, or as persisted in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Index {
    pub entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    pub fn by_name(&self, name: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn by_id(&self, id: &Id) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }
}
