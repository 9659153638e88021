use sastre_catalog::Catalog;
use sastre_model::{Index, IndexEntry, Item};
use sastre_names::NameTransformer;
use sastre_store::Store;

use crate::error::EngineError;
use crate::recipe::Recipe;
use crate::snapshot::{all_persisted_kinds, load_items};

#[derive(Debug, Default)]
pub struct MigrateReport {
    pub kinds_written: usize,
    pub items_written: usize,
    pub renamed: Vec<(String, String, String)>, // kind, old name, new name
}

/// Translates a pre-20.1 snapshot into a 20.1-compatible one (spec.md
/// §4.E.4): every item is carried forward unchanged except that (a) a
/// kind named in `recipe.field_renames` has its listed top-level body keys
/// renamed, and (b) a kind selected by `recipe.tag` has its name evaluated
/// through the recipe's Name Transformer. Attachments and attachment
/// values are never migrated. Output is a fresh workdir — the caller opens
/// `dest` with `Store::create` before calling this.
pub fn migrate(catalog: &Catalog, source: &Store, dest: &mut Store, recipe: &Recipe) -> Result<MigrateReport, EngineError> {
    // NameTransformer keys overrides by (Kind, name); the recipe's tag can
    // expand to many kinds, so build one override entry per kind it names.
    let tagged_kinds = catalog.expand_tags([&recipe.tag])?;
    let mut keyed_overrides = std::collections::HashMap::new();
    for kind in &tagged_kinds {
        for (old, new) in &recipe.name_map {
            keyed_overrides.insert((kind.clone(), old.clone()), new.clone());
        }
    }
    let transformer = NameTransformer::new(&recipe.template_string(), keyed_overrides)?;

    let kinds = all_persisted_kinds(catalog, source);
    let mut report = MigrateReport::default();

    if let Ok(info) = source.read_server_info() {
        dest.write_server_info(&info)?;
    }

    for kind in &kinds {
        let single_kind: std::collections::BTreeSet<_> = std::iter::once(kind.clone()).collect();
        let mut items: Vec<Item> = load_items(source, &single_kind);
        let field_renames = recipe.field_renames_for(kind).cloned();

        for item in &mut items {
            if let Some(renames) = &field_renames {
                if let Some(obj) = item.body.as_object_mut() {
                    for (old_field, new_field) in renames {
                        if let Some(value) = obj.remove(old_field) {
                            obj.insert(new_field.clone(), value);
                        }
                    }
                }
            }

            if tagged_kinds.contains(kind) {
                let new_name = transformer.resolve(kind, &item.name);
                if new_name != item.name {
                    report.renamed.push((kind.as_str().to_string(), item.name.clone(), new_name.clone()));
                    item.name = new_name;
                }
            }
        }

        let mut entries = Vec::with_capacity(items.len());
        for item in &items {
            dest.write_item(kind, &item.id, &item.name, &item.body)?;
            entries.push(IndexEntry {
                id: item.id.clone(),
                name: item.name.clone(),
                factory_default: item.factory_default,
                version: item.version.clone(),
                omitted: false,
            });
            report.items_written += 1;
        }
        dest.write_index(kind, &Index::new(entries))?;
        report.kinds_written += 1;
    }

    Ok(report)
}
