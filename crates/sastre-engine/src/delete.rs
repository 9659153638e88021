use regex::Regex;

use sastre_actions::{teardown_order, ActionCategory};
use sastre_graph::ReferenceGraph;
use sastre_model::{Item, Kind, Tag};

use crate::context::EngineContext;
use crate::controller::ActionDevice;
use crate::error::EngineError;

#[derive(Debug, Default)]
pub struct DeleteOptions {
    pub tags: Vec<Tag>,
    pub include: Option<Regex>,
    pub exclude: Option<Regex>,
    pub detach: bool,
    pub dry_run: bool,
}

#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: Vec<(Kind, String)>,
    /// DELETE returned 409 (the item is in use); the task continues.
    pub conflicts: Vec<(Kind, String)>,
    /// Deletion was attempted and failed for a reason other than 409, or
    /// was never attempted because the item was still referenced.
    pub still_referenced: Vec<(Kind, String)>,
}

/// Deletes items on the target controller in the reverse of restore's
/// build order — referents (dependents) first, so a policy list is never
/// deleted while a policy definition still points at it (spec.md §4.E.3,
/// §8 "Reverse order on delete").
pub async fn delete(ctx: &EngineContext, opts: &DeleteOptions) -> Result<DeleteReport, EngineError> {
    let kinds = ctx.catalog.expand_tags(opts.tags.iter())?;
    let mut report = DeleteReport::default();
    let mut items: Vec<Item> = Vec::new();

    for kind in &kinds {
        let Some(entry) = ctx.catalog.entry(kind) else { continue };
        if !entry.is_available_on(ctx.controller_version) {
            continue;
        }
        let index = ctx.controller.list(entry).await?;
        for summary in &index.entries {
            if let Some(re) = &opts.include {
                if !re.is_match(&summary.name) {
                    continue;
                }
            }
            if let Some(re) = &opts.exclude {
                if re.is_match(&summary.name) {
                    continue;
                }
            }
            let body = ctx.controller.get(entry, &summary.id).await.unwrap_or(serde_json::Value::Null);
            items.push(Item::new(kind.clone(), summary.id.clone(), summary.name.clone(), body));
        }
    }

    let graph = ReferenceGraph::build(&ctx.catalog, items)?;
    let mut delete_order = graph.topo_kinds();
    delete_order.reverse();

    if opts.detach {
        if opts.dry_run {
            tracing::info!("dry-run: would detach WAN-edge templates, deactivate active vSmart policy, detach vSmart templates");
        } else {
            detach_all(ctx, &mut report).await?;
        }
    }

    for kind in &delete_order {
        let Some(entry) = ctx.catalog.entry(kind) else { continue };
        let mut in_kind_order = graph.topo_items(kind);
        in_kind_order.reverse();

        for item in in_kind_order {
            if opts.dry_run {
                tracing::info!(%kind, name = %item.name, "dry-run: would delete");
                continue;
            }
            match ctx.controller.delete(entry, &item.id).await {
                Ok(()) => {
                    tracing::info!(%kind, name = %item.name, "done");
                    report.deleted.push((kind.clone(), item.name.clone()));
                }
                Err(EngineError::Conflict(_)) => {
                    tracing::warn!(%kind, name = %item.name, "in use, skipping");
                    report.conflicts.push((kind.clone(), item.name.clone()));
                }
                Err(e) => {
                    tracing::error!(%kind, name = %item.name, error = %e, "delete failed");
                    report.still_referenced.push((kind.clone(), item.name.clone()));
                }
            }
        }
    }

    Ok(report)
}

/// Detaches WAN-edge templates, deactivates any active vSmart policy, then
/// detaches vSmart templates — the reverse of the attach category order
/// (spec.md §4.E.3, §4.F.6).
async fn detach_all(ctx: &EngineContext, report: &mut DeleteReport) -> Result<(), EngineError> {
    let devices: Vec<(sastre_model::Id, String)> = ctx
        .controller
        .list_devices()
        .await?
        .into_iter()
        .map(|(id, _hostname, system_ip)| (id, system_ip))
        .collect();

    for category in teardown_order() {
        match category {
            ActionCategory::AttachWanEdgeTemplate => {
                let Some(entry) = ctx.catalog.entry(&Kind::new("template_device")) else { continue };
                let index = ctx.controller.list(entry).await?;
                for summary in &index.entries {
                    let action_devices: Vec<ActionDevice> = devices
                        .iter()
                        .map(|(id, ip)| ActionDevice {
                            id: id.clone(),
                            system_ip: ip.clone(),
                            values: Default::default(),
                        })
                        .collect();
                    if action_devices.is_empty() {
                        continue;
                    }
                    if let Err(e) = ctx
                        .controller
                        .run_device_action(category, &summary.id, action_devices, true)
                        .await
                    {
                        report.still_referenced.push((Kind::new("template_device"), summary.name.clone()));
                        tracing::warn!(name = %summary.name, error = %e, "detach failed");
                    }
                }
            }
            ActionCategory::ActivateVsmartPolicy => {
                let Some(entry) = ctx.catalog.entry(&Kind::new("policy_vsmart")) else { continue };
                let index = ctx.controller.list(entry).await?;
                for summary in &index.entries {
                    if let Err(e) = ctx.controller.activate_policy(&summary.id, true).await {
                        tracing::warn!(name = %summary.name, error = %e, "deactivate failed");
                    }
                }
            }
            ActionCategory::AttachVsmartTemplate => {
                let Some(entry) = ctx.catalog.entry(&Kind::new("policy_vsmart")) else { continue };
                let index = ctx.controller.list(entry).await?;
                for summary in &index.entries {
                    let action_devices: Vec<ActionDevice> = devices
                        .iter()
                        .map(|(id, ip)| ActionDevice {
                            id: id.clone(),
                            system_ip: ip.clone(),
                            values: Default::default(),
                        })
                        .collect();
                    if action_devices.is_empty() {
                        continue;
                    }
                    if let Err(e) = ctx
                        .controller
                        .run_device_action(category, &summary.id, action_devices, true)
                        .await
                    {
                        tracing::warn!(name = %summary.name, error = %e, "vSmart template detach failed");
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_have_no_filters() {
        let opts = DeleteOptions::default();
        assert!(opts.include.is_none());
        assert!(!opts.detach);
    }
}
