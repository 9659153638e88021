use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use serde_json::{json, Value};

use sastre_actions::{attach_order, ActionCategory, ActionOutcome};
use sastre_catalog::{walk_set_mut, Pointer};
use sastre_graph::ReferenceGraph;
use sastre_model::{canonicalize, digest, Id, Index, Item, Kind, Tag};
use sastre_store::Store;

use crate::context::EngineContext;
use crate::controller::ActionDevice;
use crate::error::EngineError;
use crate::snapshot::load_items;

/// `create-only` (default) never touches an existing target item;
/// `update` additionally PUTs an existing item when its canonical body
/// differs from the target's (spec.md §4.E.2). There is no separate
/// `--force` mode — see DESIGN.md's Open Question resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    CreateOnly,
    Update,
}

impl Default for UpdateMode {
    fn default() -> Self {
        UpdateMode::CreateOnly
    }
}

#[derive(Debug, Default)]
pub struct RestoreOptions {
    pub tags: Vec<Tag>,
    pub include: Option<Regex>,
    pub exclude: Option<Regex>,
    pub mode: UpdateMode,
    pub attach: bool,
    pub dry_run: bool,
}

#[derive(Debug, Default)]
pub struct RestoreReport {
    pub created: Vec<(Kind, String)>,
    pub updated: Vec<(Kind, String)>,
    pub skipped: Vec<(Kind, String)>,
    pub failed: Vec<(Kind, String, String)>,
    pub warnings: Vec<String>,
    pub attach_outcome: Option<ActionOutcome>,
}

enum Disposition {
    Create,
    CreateAsNonDefault,
    Skip { target_id: Id },
    UpdateIfDifferent { target_id: Id },
}

/// Runs a restore: loads the source snapshot, computes a push plan in
/// dependency order against the target controller's current state, and
/// executes it (spec.md §4.E.2).
pub async fn restore(
    ctx: &EngineContext,
    store: &Store,
    opts: &RestoreOptions,
) -> Result<RestoreReport, EngineError> {
    let mut report = RestoreReport::default();
    warn_on_version_skew(ctx, store, &mut report);

    let mut kinds = ctx.catalog.expand_tags(opts.tags.iter())?;
    kinds.retain(|kind| {
        let available = ctx.catalog.entry(kind).map(|e| e.is_available_on(ctx.controller_version)).unwrap_or(false);
        if !available {
            report.warnings.push(format!("{kind} unsupported on target controller version, skipping"));
        }
        available
    });

    if kinds.contains(&Kind::new("template_device")) && !ctx.controller.vbond_configured().await? {
        report
            .warnings
            .push("target controller has no configured vBond, skipping all device templates".to_string());
        kinds.remove(&Kind::new("template_device"));
    }

    let mut items = load_items(store, &kinds);
    items.retain(|item| matches_filters(&item.name, opts));

    let graph = ReferenceGraph::build(&ctx.catalog, items)?;

    let mut target_indexes: HashMap<Kind, Index> = HashMap::new();
    for kind in &kinds {
        let Some(entry) = ctx.catalog.entry(kind) else { continue };
        target_indexes.insert(kind.clone(), ctx.controller.list(entry).await?);
    }

    let mut id_map: HashMap<(Kind, Id), Id> = HashMap::new();
    let mut reattach_candidates: BTreeSet<String> = BTreeSet::new();

    for kind in graph.topo_kinds() {
        let Some(entry) = ctx.catalog.entry(&kind) else { continue };
        let target_index = target_indexes.get(&kind).cloned().unwrap_or_default();

        for item in graph.topo_items(&kind) {
            let disposition = match target_index.by_name(&item.name) {
                Some(target_entry) if opts.mode == UpdateMode::Update => Disposition::UpdateIfDifferent {
                    target_id: target_entry.id.clone(),
                },
                Some(target_entry) => Disposition::Skip {
                    target_id: target_entry.id.clone(),
                },
                None if item.factory_default => Disposition::CreateAsNonDefault,
                None => Disposition::Create,
            };

            match disposition {
                Disposition::Skip { target_id } => {
                    id_map.insert((kind.clone(), item.id.clone()), target_id);
                    report.skipped.push((kind.clone(), item.name.clone()));
                }
                Disposition::UpdateIfDifferent { target_id } => {
                    id_map.insert((kind.clone(), item.id.clone()), target_id.clone());
                    let rewritten = graph.rewrite(&kind, &item.body, &id_map);

                    if opts.dry_run {
                        report.updated.push((kind.clone(), item.name.clone()));
                        continue;
                    }

                    match ctx.controller.get(entry, &target_id).await {
                        Ok(target_body)
                            if canonicalize(&without_identity(&rewritten, entry.id_field))
                                == canonicalize(&without_identity(&target_body, entry.id_field)) =>
                        {
                            report.skipped.push((kind.clone(), item.name.clone()));
                        }
                        Ok(_) | Err(_) => match ctx.controller.update(entry, &target_id, &rewritten).await {
                            Ok(()) => {
                                report.updated.push((kind.clone(), item.name.clone()));
                                reattach_candidates.insert(item.name.clone());
                            }
                            Err(e) => {
                                tracing::error!(%kind, name = %item.name, digest = %digest(&rewritten), error = %e, "update failed");
                                report.failed.push((kind.clone(), item.name.clone(), e.to_string()));
                            }
                        },
                    }
                }
                Disposition::Create | Disposition::CreateAsNonDefault => {
                    let mut body = item.body.clone();
                    if matches!(disposition, Disposition::CreateAsNonDefault) {
                        walk_set_mut(&mut body, entry.factory_default_field, &mut |v| *v = json!(false));
                        report
                            .warnings
                            .push(format!("{kind} {:?} is factory-default on source but absent on target; creating as non-default", item.name));
                    }

                    let rewritten = graph.rewrite(&kind, &body, &id_map);

                    if opts.dry_run {
                        report.created.push((kind.clone(), item.name.clone()));
                        continue;
                    }

                    match ctx.controller.create(entry, &rewritten).await {
                        Ok(new_id) => {
                            id_map.insert((kind.clone(), item.id.clone()), new_id);
                            report.created.push((kind.clone(), item.name.clone()));
                            if kind.as_str() == "template_device" {
                                reattach_candidates.insert(item.name.clone());
                            }
                        }
                        Err(e) => {
                            tracing::error!(%kind, name = %item.name, digest = %digest(&rewritten), error = %e, "create failed");
                            report.failed.push((kind.clone(), item.name.clone(), e.to_string()));
                        }
                    }
                }
            }
        }
    }

    if opts.attach && !opts.dry_run {
        let outcome = run_attach(ctx, store, &reattach_candidates, &mut report).await?;
        report.attach_outcome = Some(outcome);
    }

    Ok(report)
}

/// Clears `id_field` in a copy of `body` before it is canonicalized for
/// the update-if-different comparison. `graph.rewrite` only rewrites the
/// catalog's declared `reference_sites` — an item's *own* controller-
/// assigned id is never one of those, so the source body's id (from the
/// controller it was backed up from) and the target's id (from the
/// controller being restored to) would otherwise differ on every
/// cross-controller restore and force a PUT on every run.
fn without_identity(body: &Value, id_field: Pointer) -> Value {
    let mut stripped = body.clone();
    walk_set_mut(&mut stripped, id_field, &mut |v| *v = Value::Null);
    stripped
}

fn matches_filters(name: &str, opts: &RestoreOptions) -> bool {
    if let Some(re) = &opts.include {
        if !re.is_match(name) {
            return false;
        }
    }
    if let Some(re) = &opts.exclude {
        if re.is_match(name) {
            return false;
        }
    }
    true
}

/// WARNs on a major.minor mismatch between the source snapshot and the
/// target controller in either direction (spec.md §9, Open Question:
/// treated as WARN rather than fatal — the catalog's version gating is
/// what actually removes unsupported kinds from the plan).
fn warn_on_version_skew(ctx: &EngineContext, store: &Store, report: &mut RestoreReport) {
    let Ok(info) = store.read_server_info() else { return };
    let Some(version) = info.get("version").and_then(|v| v.as_str()) else { return };
    let Some((major, minor)) = parse_major_minor(version) else { return };
    if (major, minor) != ctx.controller_version {
        report.warnings.push(format!(
            "source snapshot version {major}.{minor} differs from target controller version {}.{}",
            ctx.controller_version.0, ctx.controller_version.1
        ));
    }
}

fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Re-attaches every device template named in `candidates` that has
/// persisted attachment records in `store`, using the target controller's
/// existing variable values (spec.md §4.E.6: the authoritative, possibly
/// hand-edited source). Runs WAN-edge templates first, then vSmart
/// templates, then vSmart policy activation, never overlapping categories
/// (spec.md §4.F.6) — this engine treats every device template uniformly
/// as the WAN-edge category, since policy activation is driven separately
/// by `policy_vsmart` updates, not by template attach records.
async fn run_attach(
    ctx: &EngineContext,
    store: &Store,
    candidates: &BTreeSet<String>,
    report: &mut RestoreReport,
) -> Result<ActionOutcome, EngineError> {
    let device_template = Kind::new("template_device");
    let Some(entry) = ctx.catalog.entry(&device_template) else {
        return Ok(ActionOutcome::Success);
    };
    let target_index = ctx.controller.list(entry).await?;

    let mut outcomes = Vec::new();
    for category in attach_order() {
        if category != ActionCategory::AttachWanEdgeTemplate {
            continue;
        }
        for name in candidates {
            let Some(target_entry) = target_index.by_name(name) else { continue };
            let Ok(attachments) = store.read_attachments_by_identity(&device_template, &target_entry.id, name) else {
                continue;
            };
            let Ok(values_by_device) = store.read_values_by_identity(&device_template, &target_entry.id, name) else {
                continue;
            };
            if attachments.is_empty() {
                continue;
            }

            let devices: Vec<ActionDevice> = attachments
                .iter()
                .map(|a| ActionDevice {
                    id: a.device_id.clone(),
                    system_ip: a.device_id.as_str().to_string(),
                    values: values_by_device.get(a.device_id.as_str()).cloned().unwrap_or_default(),
                })
                .collect();

            match ctx
                .controller
                .run_device_action(category, &target_entry.id, devices, false)
                .await
            {
                Ok(outcome) => {
                    if outcome != ActionOutcome::Success {
                        report.warnings.push(format!("re-attach of {name} completed as {outcome:?}"));
                    }
                    outcomes.push(outcome);
                }
                Err(e) => {
                    report.warnings.push(format!("re-attach of {name} failed: {e}"));
                    outcomes.push(ActionOutcome::Failure);
                }
            }
        }
    }

    Ok(outcomes
        .into_iter()
        .max_by_key(|o| match o {
            ActionOutcome::Success => 0,
            ActionOutcome::PartialFailure => 1,
            ActionOutcome::Failure => 2,
            ActionOutcome::TimedOut => 3,
        })
        .unwrap_or(ActionOutcome::Success))
}
