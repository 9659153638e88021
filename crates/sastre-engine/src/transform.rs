use std::collections::{BTreeMap, HashMap};

use sastre_catalog::Catalog;
use sastre_graph::ReferenceGraph;
use sastre_model::{Id, Index, IndexEntry, Item, Kind};
use sastre_names::{check_collisions, NameTransformer};
use sastre_store::Store;

use crate::error::EngineError;
use crate::recipe::Recipe;
use crate::snapshot::all_persisted_kinds;

#[derive(Debug, Default)]
pub struct TransformReport {
    pub renamed: Vec<(Kind, String, String)>,
    pub copied: Vec<(Kind, String, String)>,
}

/// Renames (or copies-and-renames) every item of `recipe.tag`'s kinds
/// according to its Name Transformer, rewriting every reference to a
/// retargeted item, and writes the result to `dest` (spec.md §4.E.5). The
/// output is a complete, independently pushable snapshot — every kind
/// present in `source` is carried forward, not just the tagged ones.
pub fn transform(catalog: &Catalog, source: &Store, dest: &mut Store, recipe: &Recipe) -> Result<TransformReport, EngineError> {
    let tagged_kinds = catalog.expand_tags([&recipe.tag])?;
    let mut keyed_overrides = HashMap::new();
    for kind in &tagged_kinds {
        for (old, new) in &recipe.name_map {
            keyed_overrides.insert((kind.clone(), old.clone()), new.clone());
        }
    }
    let transformer = NameTransformer::new(&recipe.template_string(), keyed_overrides)?;

    let all_kinds = all_persisted_kinds(catalog, source);
    let mut items: HashMap<(Kind, Id), Item> = HashMap::new();
    for kind in &all_kinds {
        for item in crate::snapshot::load_items(source, &std::iter::once(kind.clone()).collect()) {
            items.insert((item.kind.clone(), item.id.clone()), item);
        }
    }

    let mut report = TransformReport::default();
    let mut retarget: HashMap<(Kind, Id), Id> = HashMap::new();
    let mut renamed_pairs: BTreeMap<Kind, Vec<(String, String)>> = BTreeMap::new();
    let original_keys: Vec<(Kind, Id)> = items.keys().cloned().collect();

    for key @ (kind, id) in &original_keys {
        if !tagged_kinds.contains(kind) {
            continue;
        }
        let original_name = items[key].name.clone();
        let new_name = transformer.resolve(kind, &original_name);
        if new_name == original_name {
            continue;
        }

        let explicitly_retargeted = recipe.name_map.contains_key(&original_name);
        renamed_pairs.entry(kind.clone()).or_default().push((original_name.clone(), new_name.clone()));

        if recipe.copy {
            let new_id = Id::new(format!("{}-{}", id.as_str(), uuid::Uuid::new_v4().simple()));
            let mut copy = items[key].clone();
            copy.id = new_id.clone();
            copy.name = new_name.clone();
            report.copied.push((kind.clone(), original_name.clone(), new_name));
            items.insert((kind.clone(), new_id.clone()), copy);
            if explicitly_retargeted {
                retarget.insert((kind.clone(), id.clone()), new_id);
            }
        } else {
            report.renamed.push((kind.clone(), original_name, new_name.clone()));
            items.get_mut(key).expect("key came from this map").name = new_name;
        }
    }

    for (kind, pairs) in &renamed_pairs {
        check_collisions(kind, pairs)?;
    }

    if !retarget.is_empty() {
        let graph = ReferenceGraph::build(catalog, items.values().cloned())?;
        for item in items.values_mut() {
            item.body = graph.rewrite(&item.kind, &item.body, &retarget);
        }
    }

    let mut by_kind: BTreeMap<Kind, Vec<&Item>> = BTreeMap::new();
    for item in items.values() {
        by_kind.entry(item.kind.clone()).or_default().push(item);
    }
    for (kind, mut kind_items) in by_kind {
        kind_items.sort_by(|a, b| a.name.cmp(&b.name));
        let mut entries = Vec::with_capacity(kind_items.len());
        for item in &kind_items {
            dest.write_item(&kind, &item.id, &item.name, &item.body)?;
            entries.push(IndexEntry {
                id: item.id.clone(),
                name: item.name.clone(),
                factory_default: item.factory_default,
                version: item.version.clone(),
                omitted: false,
            });
        }
        dest.write_index(&kind, &Index::new(entries))?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sastre_catalog::Catalog;
    use sastre_model::{Id, Kind};
    use tempfile::tempdir;

    #[test]
    fn rename_rewrites_referrer_id_only_when_explicit() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new();

        let mut source = Store::create(&dir.path().join("src"), false).unwrap();
        let feature_kind = Kind::new("template_feature");
        let device_kind = Kind::new("template_device");

        source
            .write_item(
                &feature_kind,
                &Id::new("ft1"),
                "Logging_Template_cEdge",
                &serde_json::json!({}),
            )
            .unwrap();
        source
            .write_index(
                &feature_kind,
                &Index::new(vec![IndexEntry {
                    id: Id::new("ft1"),
                    name: "Logging_Template_cEdge".to_string(),
                    factory_default: false,
                    version: None,
                    omitted: false,
                }]),
            )
            .unwrap();

        source
            .write_item(
                &device_kind,
                &Id::new("dt1"),
                "DT1",
                &serde_json::json!({"generalTemplates": [{"templateId": "ft1"}]}),
            )
            .unwrap();
        source
            .write_index(
                &device_kind,
                &Index::new(vec![IndexEntry {
                    id: Id::new("dt1"),
                    name: "DT1".to_string(),
                    factory_default: false,
                    version: None,
                    omitted: false,
                }]),
            )
            .unwrap();

        let yaml = "tag: template_feature\nname_map:\n  Logging_Template_cEdge: Logging_Template_v01\n";
        let recipe = Recipe::parse(yaml).unwrap();

        let mut dest = Store::create(&dir.path().join("dst"), false).unwrap();
        let report = transform(&catalog, &source, &mut dest, &recipe).unwrap();

        assert_eq!(
            report.renamed,
            vec![(feature_kind.clone(), "Logging_Template_cEdge".to_string(), "Logging_Template_v01".to_string())]
        );

        let renamed_index = dest.read_index(&feature_kind).unwrap();
        assert_eq!(renamed_index.entries[0].name, "Logging_Template_v01");

        // Rename-in-place keeps the same id, so nothing needed rewriting.
        let device_body = dest.read_item(&device_kind, "DT1").unwrap();
        assert_eq!(device_body["generalTemplates"][0]["templateId"], serde_json::json!("ft1"));
    }

    #[test]
    fn copy_with_explicit_name_map_retargets_referrer() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new();

        let mut source = Store::create(&dir.path().join("src"), false).unwrap();
        let feature_kind = Kind::new("template_feature");
        let device_kind = Kind::new("template_device");

        source
            .write_item(&feature_kind, &Id::new("ft1"), "FT1", &serde_json::json!({}))
            .unwrap();
        source
            .write_index(
                &feature_kind,
                &Index::new(vec![IndexEntry {
                    id: Id::new("ft1"),
                    name: "FT1".to_string(),
                    factory_default: false,
                    version: None,
                    omitted: false,
                }]),
            )
            .unwrap();
        source
            .write_item(
                &device_kind,
                &Id::new("dt1"),
                "DT1",
                &serde_json::json!({"generalTemplates": [{"templateId": "ft1"}]}),
            )
            .unwrap();
        source
            .write_index(
                &device_kind,
                &Index::new(vec![IndexEntry {
                    id: Id::new("dt1"),
                    name: "DT1".to_string(),
                    factory_default: false,
                    version: None,
                    omitted: false,
                }]),
            )
            .unwrap();

        let yaml = "tag: template_feature\nname_map:\n  FT1: FT1-copy\ncopy: true\n";
        let recipe = Recipe::parse(yaml).unwrap();

        let mut dest = Store::create(&dir.path().join("dst"), false).unwrap();
        let report = transform(&catalog, &source, &mut dest, &recipe).unwrap();

        assert_eq!(report.copied.len(), 1);
        let original_index = dest.read_index(&feature_kind).unwrap();
        assert_eq!(original_index.entries.len(), 2);

        let device_body = dest.read_item(&device_kind, "DT1").unwrap();
        assert_ne!(device_body["generalTemplates"][0]["templateId"], serde_json::json!("ft1"));
    }

    #[test]
    fn collision_after_transform_is_rejected() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new();

        let mut source = Store::create(&dir.path().join("src"), false).unwrap();
        let kind = Kind::new("policy_list.site");
        for (id, name) in [("1", "DC1"), ("2", "DC2")] {
            source.write_item(&kind, &Id::new(id), name, &serde_json::json!({})).unwrap();
        }
        source
            .write_index(
                &kind,
                &Index::new(vec![
                    IndexEntry { id: Id::new("1"), name: "DC1".into(), factory_default: false, version: None, omitted: false },
                    IndexEntry { id: Id::new("2"), name: "DC2".into(), factory_default: false, version: None, omitted: false },
                ]),
            )
            .unwrap();

        let yaml = "tag: policy_list\nname_template:\n  regex: \"DC\\\\d+\"\n";
        let recipe = Recipe::parse(yaml).unwrap();
        let mut dest = Store::create(&dir.path().join("dst"), false).unwrap();
        let err = transform(&catalog, &source, &mut dest, &recipe).unwrap_err();
        assert!(matches!(err, EngineError::NameCollision(_)));
    }
}
