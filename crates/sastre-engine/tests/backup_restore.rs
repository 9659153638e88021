mod support;

use sastre_engine::{backup, restore, BackupOptions, EngineContext, RestoreOptions, UpdateMode};
use sastre_model::{Kind, Tag};
use sastre_store::Store;
use support::FakeController;

#[tokio::test]
async fn backup_then_restore_creates_items_on_an_empty_target() {
    let source = FakeController::new()
        .with_item(&Kind::new("policy_list.site"), "src-site-1", serde_json::json!({
            "id": "src-site-1",
            "name": "DC1",
            "factoryDefault": false,
        }));
    let ctx = EngineContext::with_controller(Box::new(source), (20, 1));

    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::create(&dir.path().join("backup"), false).unwrap();
    let backup_report = backup(&ctx, &mut store, &BackupOptions {
        tags: vec![Tag::new("policy_list")],
        ..Default::default()
    })
    .await
    .unwrap();
    assert_eq!(backup_report.items_written, 1);
    assert!(backup_report.items_skipped.is_empty());

    let target = FakeController::new();
    let target_ctx = EngineContext::with_controller(Box::new(target), (20, 1));
    let restore_report = restore(&target_ctx, &store, &RestoreOptions {
        tags: vec![Tag::new("policy_list")],
        mode: UpdateMode::CreateOnly,
        ..Default::default()
    })
    .await
    .unwrap();

    assert_eq!(restore_report.created, vec![(Kind::new("policy_list.site"), "DC1".to_string())]);
    assert!(restore_report.failed.is_empty());
}

#[tokio::test]
async fn restore_skips_an_item_that_already_exists_by_name_in_create_only_mode() {
    let source = FakeController::new().with_item(&Kind::new("policy_list.site"), "s1", serde_json::json!({
        "id": "s1", "name": "DC1", "factoryDefault": false,
    }));
    let ctx = EngineContext::with_controller(Box::new(source), (20, 1));
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::create(&dir.path().join("backup"), false).unwrap();
    backup(&ctx, &mut store, &BackupOptions { tags: vec![Tag::new("policy_list")], ..Default::default() })
        .await
        .unwrap();

    let target = FakeController::new().with_item(&Kind::new("policy_list.site"), "t1", serde_json::json!({
        "id": "t1", "name": "DC1", "factoryDefault": false,
    }));
    let target_ctx = EngineContext::with_controller(Box::new(target), (20, 1));
    let report = restore(&target_ctx, &store, &RestoreOptions {
        tags: vec![Tag::new("policy_list")],
        mode: UpdateMode::CreateOnly,
        ..Default::default()
    })
    .await
    .unwrap();

    assert!(report.created.is_empty());
    assert_eq!(report.skipped, vec![(Kind::new("policy_list.site"), "DC1".to_string())]);
}

#[tokio::test]
async fn restore_in_update_mode_pushes_a_changed_body_to_the_existing_target_item() {
    let source = FakeController::new().with_item(&Kind::new("policy_list.site"), "s1", serde_json::json!({
        "id": "s1", "name": "DC1", "factoryDefault": false, "siteId": "2",
    }));
    let ctx = EngineContext::with_controller(Box::new(source), (20, 1));
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::create(&dir.path().join("backup"), false).unwrap();
    backup(&ctx, &mut store, &BackupOptions { tags: vec![Tag::new("policy_list")], ..Default::default() })
        .await
        .unwrap();

    let target = FakeController::new().with_item(&Kind::new("policy_list.site"), "t1", serde_json::json!({
        "id": "t1", "name": "DC1", "factoryDefault": false, "siteId": "1",
    }));
    let target_ctx = EngineContext::with_controller(Box::new(target), (20, 1));
    let report = restore(&target_ctx, &store, &RestoreOptions {
        tags: vec![Tag::new("policy_list")],
        mode: UpdateMode::Update,
        ..Default::default()
    })
    .await
    .unwrap();

    assert_eq!(report.updated, vec![(Kind::new("policy_list.site"), "DC1".to_string())]);
}

#[tokio::test]
async fn restore_in_update_mode_skips_when_bodies_match_except_id() {
    let source = FakeController::new().with_item(&Kind::new("policy_list.site"), "s1", serde_json::json!({
        "id": "s1", "name": "DC1", "factoryDefault": false, "siteId": "1",
    }));
    let ctx = EngineContext::with_controller(Box::new(source), (20, 1));
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::create(&dir.path().join("backup"), false).unwrap();
    backup(&ctx, &mut store, &BackupOptions { tags: vec![Tag::new("policy_list")], ..Default::default() })
        .await
        .unwrap();

    // Same logical body as the source, differing only in the
    // controller-assigned id — the normal case for a cross-controller
    // restore, since ids are never portable between controllers.
    let target = FakeController::new().with_item(&Kind::new("policy_list.site"), "t1", serde_json::json!({
        "id": "t1", "name": "DC1", "factoryDefault": false, "siteId": "1",
    }));
    let target_ctx = EngineContext::with_controller(Box::new(target), (20, 1));
    let report = restore(&target_ctx, &store, &RestoreOptions {
        tags: vec![Tag::new("policy_list")],
        mode: UpdateMode::Update,
        ..Default::default()
    })
    .await
    .unwrap();

    assert!(report.updated.is_empty());
    assert_eq!(report.skipped, vec![(Kind::new("policy_list.site"), "DC1".to_string())]);
}

#[tokio::test]
async fn restore_drops_device_templates_when_target_vbond_is_unconfigured() {
    let source = FakeController::new().with_item(&Kind::new("template_device"), "dt1", serde_json::json!({
        "id": "dt1", "name": "DT1", "factoryDefault": false, "generalTemplates": [],
    }));
    let ctx = EngineContext::with_controller(Box::new(source), (20, 1));
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::create(&dir.path().join("backup"), false).unwrap();
    backup(&ctx, &mut store, &BackupOptions { tags: vec![Tag::new("template_device")], ..Default::default() })
        .await
        .unwrap();

    let target = FakeController::new().without_vbond();
    let target_ctx = EngineContext::with_controller(Box::new(target), (20, 1));
    let report = restore(&target_ctx, &store, &RestoreOptions {
        tags: vec![Tag::new("template_device")],
        ..Default::default()
    })
    .await
    .unwrap();

    assert!(report.created.is_empty());
    assert!(report.warnings.iter().any(|w| w.contains("vBond")));
}
