use crate::{Id, Kind};
use serde::{Deserialize, Serialize};

/// A single configuration artifact: a policy, a policy list, a feature
/// template, a device template, a certificate, and so on. `kind` names the
/// family it belongs to (see `Kind`); `id` and `name` are as assigned by a
/// controller. `references` is populated by `sastre-graph` from `body` using
/// the originating `Kind`'s catalog descriptor — it is not filled in by
/// this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub kind: Kind,
    pub id: Id,
    pub name: String,
    pub factory_default: bool,
    pub version: Option<String>,
    pub body: serde_json::Value,
    #[serde(default)]
    pub references: Vec<(Kind, Id)>,
}

impl Item {
    pub fn new(kind: Kind, id: Id, name: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
            factory_default: false,
            version: None,
            body,
            references: Vec::new(),
        }
    }
}
