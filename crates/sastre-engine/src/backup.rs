use regex::Regex;

use sastre_model::{Index, IndexEntry, Kind, Tag};
use sastre_store::Store;

use crate::context::EngineContext;
use crate::error::EngineError;

#[derive(Debug, Default)]
pub struct BackupOptions {
    pub tags: Vec<Tag>,
    pub include: Option<Regex>,
    pub exclude: Option<Regex>,
    pub save_running: bool,
}

#[derive(Debug, Default)]
pub struct BackupReport {
    pub kinds_processed: usize,
    pub items_written: usize,
    /// `(kind, name)` of every item skipped after a per-item GET failure.
    pub items_skipped: Vec<(Kind, String)>,
}

/// Runs a backup: expand tags to kinds, fetch each kind's index and item
/// bodies, and persist them to `store` (spec.md §4.E.1). A per-item GET
/// failure is logged and the item is skipped with its index entry marked
/// `omitted`; the backup still closes successfully as long as the indexes
/// themselves were written.
pub async fn backup(
    ctx: &EngineContext,
    store: &mut Store,
    opts: &BackupOptions,
) -> Result<BackupReport, EngineError> {
    let kinds = ctx.catalog.expand_tags(opts.tags.iter())?;
    let mut report = BackupReport::default();

    for kind in &kinds {
        let Some(entry) = ctx.catalog.entry(kind) else { continue };
        if !entry.is_available_on(ctx.controller_version) {
            tracing::warn!(%kind, "kind unsupported on this controller version, skipping");
            continue;
        }

        let summary_index = ctx.controller.list(entry).await?;
        let mut persisted_entries = Vec::with_capacity(summary_index.entries.len());

        for summary in &summary_index.entries {
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

            match ctx.controller.get(entry, &summary.id).await {
                Ok(body) => {
                    let stem = store.write_item(kind, &summary.id, &summary.name, &body)?;
                    report.items_written += 1;

                    if kind.as_str() == "template_device" {
                        let attached = ctx.controller.attachments(&summary.id).await?;
                        let attachments: Vec<sastre_model::Attachment> = attached
                            .iter()
                            .map(|(device_id, values)| {
                                sastre_model::Attachment::new(summary.id.clone(), device_id.clone(), values.clone())
                            })
                            .collect();
                        let values_by_device: std::collections::BTreeMap<_, _> = attached
                            .into_iter()
                            .map(|(device_id, values)| (device_id.into_string(), values))
                            .collect();
                        store.write_attachments(kind, &stem, &attachments)?;
                        store.write_values(kind, &stem, &values_by_device)?;
                    }

                    persisted_entries.push(IndexEntry {
                        id: summary.id.clone(),
                        name: summary.name.clone(),
                        factory_default: summary.factory_default,
                        version: summary.version.clone(),
                        omitted: false,
                    });
                }
                Err(e) => {
                    tracing::warn!(%kind, name = %summary.name, error = %e, "GET failed, marking item omitted");
                    report.items_skipped.push((kind.clone(), summary.name.clone()));
                    persisted_entries.push(IndexEntry {
                        id: summary.id.clone(),
                        name: summary.name.clone(),
                        factory_default: summary.factory_default,
                        version: summary.version.clone(),
                        omitted: true,
                    });
                }
            }
        }

        store.write_index(kind, &Index::new(persisted_entries))?;
        report.kinds_processed += 1;
    }

    if opts.tags.iter().any(|t| t.as_str() == "all") {
        let certs = ctx.controller.certificates_index().await?;
        store.write_certificates_index(&certs)?;

        if opts.save_running {
            for (device_id, hostname, _system_ip) in ctx.controller.list_devices().await? {
                match ctx.controller.device_running_config(&device_id).await {
                    Ok(config) => store.write_device_config(&hostname, &config)?,
                    Err(e) => tracing::warn!(%hostname, error = %e, "failed to fetch running config, skipping"),
                }
            }
        }
    }

    Ok(report)
}
