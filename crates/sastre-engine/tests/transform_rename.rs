use sastre_catalog::Catalog;
use sastre_engine::{migrate, transform, Recipe};
use sastre_model::{Id, Index, IndexEntry, Kind};
use sastre_store::Store;

fn write_one(store: &mut Store, kind: &Kind, id: &str, name: &str, body: serde_json::Value) {
    store.write_item(kind, &Id::new(id), name, &body).unwrap();
    store
        .write_index(
            kind,
            &Index::new(vec![IndexEntry {
                id: Id::new(id),
                name: name.to_string(),
                factory_default: false,
                version: None,
                omitted: false,
            }]),
        )
        .unwrap();
}

#[test]
fn transform_renames_a_tagged_kind_and_rewrites_an_explicit_retarget() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new();

    let mut source = Store::create(&dir.path().join("src"), false).unwrap();
    let list_kind = Kind::new("policy_list.site");
    let def_kind = Kind::new("policy_definition.vedge");

    write_one(&mut source, &list_kind, "site-1", "DC1", serde_json::json!({}));
    write_one(
        &mut source,
        &def_kind,
        "def-1",
        "EdgePolicy",
        serde_json::json!({"sequences": [{"match": {"entries": [{"siteListId": "site-1"}]}}]}),
    );

    let recipe = Recipe::parse("tag: policy_list\nname_map:\n  DC1: US-EAST-1\ncopy: true\n").unwrap();

    let mut dest = Store::create(&dir.path().join("dst"), false).unwrap();
    let report = transform(&catalog, &source, &mut dest, &recipe).unwrap();
    assert_eq!(report.copied.len(), 1);

    let index = dest.read_index(&list_kind).unwrap();
    assert_eq!(index.entries.len(), 2, "original and copy both persist");
    assert!(index.entries.iter().any(|e| e.name == "DC1"));
    assert!(index.entries.iter().any(|e| e.name == "US-EAST-1"));

    let def_body = dest.read_item(&def_kind, "EdgePolicy").unwrap();
    let retargeted_id = def_body["sequences"][0]["match"]["entries"][0]["siteListId"].as_str().unwrap();
    assert_ne!(retargeted_id, "site-1", "the explicit name_map rename should retarget the referrer to the copy");
}

#[test]
fn migrate_carries_every_kind_forward_and_renames_only_the_tagged_one() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Catalog::new();

    let mut source = Store::create(&dir.path().join("src"), false).unwrap();
    let list_kind = Kind::new("policy_list.site");
    let feature_kind = Kind::new("template_feature");

    write_one(&mut source, &list_kind, "site-1", "DC1_legacy", serde_json::json!({}));
    write_one(&mut source, &feature_kind, "ft-1", "UntouchedFeature", serde_json::json!({}));

    let recipe = Recipe::parse("tag: policy_list\nname_template:\n  regex: \"(.+)_legacy\"\n").unwrap();

    let mut dest = Store::create(&dir.path().join("dst"), false).unwrap();
    let report = migrate(&catalog, &source, &mut dest, &recipe).unwrap();

    assert_eq!(report.renamed, vec![("policy_list.site".to_string(), "DC1_legacy".to_string(), "DC1".to_string())]);
    assert!(dest.read_item(&list_kind, "DC1").is_ok());
    assert!(dest.read_item(&feature_kind, "UntouchedFeature").is_ok());
}
