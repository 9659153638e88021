use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Value};

use sastre_actions::{ActionCategory, ActionEngine, ActionOutcome, Device};
use sastre_catalog::{get_bool, get_str, CatalogEntry};
use sastre_client::{AggregateStatus, Client};
use sastre_model::{Id, Index, IndexEntry};

use crate::error::EngineError;

/// One device's identity for an attach/detach action: its controller id,
/// its system-ip (the chunk-ordering key, spec.md §4.F.1), and the
/// attachment variable values to submit with it.
#[derive(Debug, Clone)]
pub struct ActionDevice {
    pub id: Id,
    pub system_ip: String,
    pub values: BTreeMap<String, String>,
}

/// Everything a task needs from a controller, abstracted behind a trait so
/// tests can substitute an in-memory fake instead of talking to a real
/// vManage (grounded on the teacher's no-op resolver pattern for testing
/// catalog-driven logic without live I/O).
#[async_trait::async_trait]
pub trait ControllerApi: Send + Sync {
    async fn list(&self, entry: &CatalogEntry) -> Result<Index, EngineError>;
    async fn get(&self, entry: &CatalogEntry, id: &Id) -> Result<Value, EngineError>;
    async fn create(&self, entry: &CatalogEntry, body: &Value) -> Result<Id, EngineError>;
    async fn update(&self, entry: &CatalogEntry, id: &Id, body: &Value) -> Result<(), EngineError>;
    async fn delete(&self, entry: &CatalogEntry, id: &Id) -> Result<(), EngineError>;

    async fn attachments(&self, template_id: &Id) -> Result<Vec<(Id, BTreeMap<String, String>)>, EngineError>;
    async fn vbond_configured(&self) -> Result<bool, EngineError>;
    async fn certificates_index(&self) -> Result<Value, EngineError>;
    async fn device_running_config(&self, device_id: &Id) -> Result<String, EngineError>;
    async fn controller_version(&self) -> Result<(u32, u32), EngineError>;
    /// `(device id, hostname, system-ip)` for every device in inventory.
    async fn list_devices(&self) -> Result<Vec<(Id, String, String)>, EngineError>;

    /// Submits a chunked attach or detach action for `devices` against
    /// `template_id`, and polls every chunk to a terminal status (spec.md
    /// §4.F). `teardown` selects detach semantics for the same category.
    async fn run_device_action(
        &self,
        category: ActionCategory,
        template_id: &Id,
        devices: Vec<ActionDevice>,
        teardown: bool,
    ) -> Result<ActionOutcome, EngineError>;

    /// Activates (or deactivates) the vSmart policy `policy_id` and polls
    /// it to a terminal status.
    async fn activate_policy(&self, policy_id: &Id, deactivate: bool) -> Result<ActionOutcome, EngineError>;
}

#[derive(Deserialize)]
struct ListResponse {
    data: Vec<Value>,
}

#[derive(Deserialize)]
struct CreateResponse {
    #[serde(alias = "templateId", alias = "listId", alias = "definitionId")]
    id: Option<String>,
}

#[async_trait::async_trait]
impl ControllerApi for Client {
    async fn list(&self, entry: &CatalogEntry) -> Result<Index, EngineError> {
        let response: ListResponse = self.get_json(entry.endpoints.list).await?;
        let entries = response
            .data
            .iter()
            .map(|item| IndexEntry {
                id: Id::new(get_str(item, entry.id_field).unwrap_or_default()),
                name: get_str(item, entry.name_field).unwrap_or_default().to_string(),
                factory_default: get_bool(item, entry.factory_default_field).unwrap_or(false),
                version: None,
                omitted: false,
            })
            .collect();
        Ok(Index::new(entries))
    }

    async fn get(&self, entry: &CatalogEntry, id: &Id) -> Result<Value, EngineError> {
        let path = format!("{}/{}", entry.endpoints.get, id.as_str());
        Ok(self.get_json(&path).await?)
    }

    async fn create(&self, entry: &CatalogEntry, body: &Value) -> Result<Id, EngineError> {
        let response: CreateResponse = self.post_json(entry.endpoints.post, body).await?;
        let id = response.id.ok_or_else(|| {
            EngineError::InvalidBackup(format!("controller did not return an id from POST {}", entry.endpoints.post))
        })?;
        Ok(Id::new(id))
    }

    async fn update(&self, entry: &CatalogEntry, id: &Id, body: &Value) -> Result<(), EngineError> {
        let path = format!("{}/{}", entry.endpoints.put, id.as_str());
        let _: Value = self.put_json(&path, body).await?;
        Ok(())
    }

    async fn delete(&self, entry: &CatalogEntry, id: &Id) -> Result<(), EngineError> {
        let path = format!("{}/{}", entry.endpoints.delete, id.as_str());
        Ok(self.delete(&path).await?)
    }

    async fn attachments(&self, template_id: &Id) -> Result<Vec<(Id, BTreeMap<String, String>)>, EngineError> {
        #[derive(Deserialize)]
        struct AttachedDevice {
            #[serde(rename = "uuid")]
            device_id: String,
        }
        #[derive(Deserialize)]
        struct AttachedResponse {
            data: Vec<AttachedDevice>,
        }
        #[derive(Deserialize)]
        struct ValuesResponse {
            data: Vec<BTreeMap<String, String>>,
        }

        let attached: AttachedResponse = self
            .get_json(&format!("template/device/config/attached/{}", template_id.as_str()))
            .await?;
        let mut out = Vec::new();
        for device in attached.data {
            let values: ValuesResponse = self
                .get_json(&format!(
                    "template/device/config/input/{}/{}",
                    template_id.as_str(),
                    device.device_id
                ))
                .await?;
            out.push((Id::new(device.device_id), values.data.into_iter().next().unwrap_or_default()));
        }
        Ok(out)
    }

    async fn vbond_configured(&self) -> Result<bool, EngineError> {
        #[derive(Deserialize)]
        struct Settings {
            #[serde(rename = "domainIp")]
            domain_ip: Option<String>,
        }
        #[derive(Deserialize)]
        struct SettingsResponse {
            data: Vec<Settings>,
        }
        let response: SettingsResponse = self.get_json("settings/configuration/device").await?;
        Ok(response.data.iter().any(|s| s.domain_ip.as_deref().is_some_and(|ip| !ip.is_empty())))
    }

    async fn certificates_index(&self) -> Result<Value, EngineError> {
        Ok(self.get_json("certificate/vedge/list").await?)
    }

    async fn device_running_config(&self, device_id: &Id) -> Result<String, EngineError> {
        #[derive(Deserialize)]
        struct RunningConfig {
            config: String,
        }
        let resp: RunningConfig = self
            .get_json(&format!("device/config/running/{}", device_id.as_str()))
            .await?;
        Ok(resp.config)
    }

    async fn controller_version(&self) -> Result<(u32, u32), EngineError> {
        #[derive(Deserialize)]
        struct ServerInfo {
            version: String,
        }
        #[derive(Deserialize)]
        struct ServerInfoResponse {
            data: Vec<ServerInfo>,
        }
        let response: ServerInfoResponse = self.get_json("client/server").await?;
        let version = response
            .data
            .first()
            .map(|s| s.version.as_str())
            .ok_or_else(|| EngineError::InvalidBackup("server info response had no entries".into()))?;
        parse_major_minor(version)
            .ok_or_else(|| EngineError::InvalidBackup(format!("unparseable controller version {version:?}")))
    }

    async fn list_devices(&self) -> Result<Vec<(Id, String, String)>, EngineError> {
        #[derive(Deserialize)]
        struct DeviceEntry {
            #[serde(rename = "uuid")]
            id: String,
            #[serde(rename = "host-name")]
            hostname: String,
            #[serde(rename = "system-ip")]
            system_ip: String,
        }
        #[derive(Deserialize)]
        struct DeviceResponse {
            data: Vec<DeviceEntry>,
        }
        let response: DeviceResponse = self.get_json("system/device/vedges").await?;
        Ok(response
            .data
            .into_iter()
            .map(|d| (Id::new(d.id), d.hostname, d.system_ip))
            .collect())
    }

    async fn run_device_action(
        &self,
        category: ActionCategory,
        template_id: &Id,
        devices: Vec<ActionDevice>,
        teardown: bool,
    ) -> Result<ActionOutcome, EngineError> {
        let path = action_path(category, teardown);
        let values_by_device: BTreeMap<String, BTreeMap<String, String>> = devices
            .iter()
            .map(|d| (d.id.as_str().to_string(), d.values.clone()))
            .collect();
        let template_id = template_id.clone();
        let plain_devices: Vec<Device> = devices
            .into_iter()
            .map(|d| Device::new(d.id, d.system_ip))
            .collect();

        let engine = ActionEngine::new(self);
        let outcome = engine
            .run(plain_devices, &path, move |chunk| {
                json!({
                    "templateId": template_id.as_str(),
                    "device": chunk.iter().map(|d| json!({
                        "deviceId": d.id.as_str(),
                        "deviceIP": d.system_ip,
                        "variables": values_by_device.get(d.id.as_str()).cloned().unwrap_or_default(),
                    })).collect::<Vec<_>>(),
                })
            })
            .await?;
        Ok(outcome)
    }

    async fn activate_policy(&self, policy_id: &Id, deactivate: bool) -> Result<ActionOutcome, EngineError> {
        #[derive(Deserialize)]
        struct SubmitResponse {
            id: String,
        }
        let verb = if deactivate { "deactivate" } else { "activate" };
        let path = format!("template/policy/vsmart/{verb}/{}", policy_id.as_str());
        let response: SubmitResponse = self.post_json(&path, &json!({})).await?;
        let poll = self.poll_action(&response.id, None, None).await?;
        Ok(match poll.status {
            AggregateStatus::Success => ActionOutcome::Success,
            AggregateStatus::Failure => ActionOutcome::Failure,
            AggregateStatus::PartialFailure => ActionOutcome::PartialFailure,
            AggregateStatus::TimedOut => ActionOutcome::TimedOut,
        })
    }
}

/// The submit endpoint for one action category, attach or detach shaped
/// (spec.md §4.F.6: attach WAN-edge -> attach vSmart template -> activate
/// policy, reversed for teardown).
fn action_path(category: ActionCategory, teardown: bool) -> String {
    let verb = if teardown { "detach" } else { "attach" };
    match category {
        ActionCategory::AttachWanEdgeTemplate => format!("template/device/config/{verb}feature"),
        ActionCategory::AttachVsmartTemplate => format!("template/device/config/{verb}cli"),
        ActionCategory::ActivateVsmartPolicy => format!("template/policy/vsmart/{verb}"),
    }
}

fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next()?.parse().ok()?;
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_major_minor_from_dotted_version_string() {
        assert_eq!(parse_major_minor("20.1.1"), Some((20, 1)));
        assert_eq!(parse_major_minor("19.2"), Some((19, 2)));
        assert_eq!(parse_major_minor("not-a-version"), None);
    }
}
