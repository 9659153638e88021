use std::collections::BTreeSet;

use sastre_catalog::Catalog;
use sastre_model::{Item, Kind};
use sastre_store::Store;

/// Loads every non-omitted item of `kinds` out of `store`, via the catalog
/// so kind-specific knowledge never leaks into this function. A kind with
/// no index in the store (never backed up, or a kind added to the catalog
/// after this snapshot was taken) is silently absent from the result —
/// callers that need to distinguish "empty" from "missing" should call
/// `store.read_index` directly.
pub fn load_items(store: &Store, kinds: &BTreeSet<Kind>) -> Vec<Item> {
    let mut items = Vec::new();
    for kind in kinds {
        let index = match store.read_index(kind) {
            Ok(index) => index,
            Err(_) => continue,
        };
        for entry in &index.entries {
            if entry.omitted {
                continue;
            }
            match store.read_item_by_identity(kind, &entry.id, &entry.name) {
                Ok(body) => items.push(Item {
                    kind: kind.clone(),
                    id: entry.id.clone(),
                    name: entry.name.clone(),
                    factory_default: entry.factory_default,
                    version: entry.version.clone(),
                    body,
                    references: Vec::new(),
                }),
                Err(e) => {
                    tracing::warn!(%kind, name = %entry.name, error = %e, "could not read item body from store, skipping");
                }
            }
        }
    }
    items
}

/// Every kind the catalog knows about that also has a persisted index in
/// `store` — the full set Transform/Migrate carry forward regardless of
/// which kinds their recipe's `tag` selects for renaming.
pub fn all_persisted_kinds(catalog: &Catalog, store: &Store) -> BTreeSet<Kind> {
    catalog
        .entries()
        .map(|e| e.kind())
        .filter(|kind| store.read_index(kind).is_ok())
        .collect()
}
