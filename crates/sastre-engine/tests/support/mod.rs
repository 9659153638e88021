use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use serde_json::Value;

use sastre_actions::{ActionCategory, ActionOutcome};
use sastre_catalog::{get_bool, get_str, CatalogEntry};
use sastre_engine::{ActionDevice, ControllerApi, EngineError};
use sastre_model::{Id, Index, IndexEntry, Kind};

/// An in-memory stand-in for a controller, used by every integration test
/// in this crate instead of a live `sastre_client::Client`. Holds one item
/// table per kind, plus enough device/attachment/action bookkeeping for
/// restore's re-attach step and delete's detach step to exercise
/// meaningfully.
#[derive(Default)]
pub struct FakeController {
    items: Mutex<BTreeMap<Kind, Vec<(Id, Value)>>>,
    next_id: Mutex<u64>,
    vbond: Mutex<bool>,
    devices: Mutex<Vec<(Id, String, String)>>,
    attached: Mutex<BTreeMap<String, Vec<(Id, BTreeMap<String, String>)>>>,
    conflicts: Mutex<BTreeSet<Id>>,
    pub version: (u32, u32),
}

impl FakeController {
    pub fn new() -> Self {
        FakeController {
            vbond: Mutex::new(true),
            version: (20, 1),
            ..Default::default()
        }
    }

    pub fn with_item(self, kind: &Kind, id: &str, body: Value) -> Self {
        self.items.lock().unwrap().entry(kind.clone()).or_default().push((Id::new(id), body));
        self
    }

    pub fn with_device(self, id: &str, hostname: &str, system_ip: &str) -> Self {
        self.devices.lock().unwrap().push((Id::new(id), hostname.to_string(), system_ip.to_string()));
        self
    }

    pub fn with_attachment(self, template_id: &str, device_id: &str, values: BTreeMap<String, String>) -> Self {
        self.attached
            .lock()
            .unwrap()
            .entry(template_id.to_string())
            .or_default()
            .push((Id::new(device_id), values));
        self
    }

    pub fn without_vbond(self) -> Self {
        *self.vbond.lock().unwrap() = false;
        self
    }

    pub fn conflict_on(self, id: &str) -> Self {
        self.conflicts.lock().unwrap().insert(Id::new(id));
        self
    }

    pub fn items_of(&self, kind: &Kind) -> Vec<(Id, Value)> {
        self.items.lock().unwrap().get(kind).cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ControllerApi for FakeController {
    async fn list(&self, entry: &CatalogEntry) -> Result<Index, EngineError> {
        let items = self.items.lock().unwrap();
        let entries = items
            .get(&entry.kind())
            .into_iter()
            .flatten()
            .map(|(id, body)| IndexEntry {
                id: id.clone(),
                name: get_str(body, entry.name_field).unwrap_or_default().to_string(),
                factory_default: get_bool(body, entry.factory_default_field).unwrap_or(false),
                version: None,
                omitted: false,
            })
            .collect();
        Ok(Index::new(entries))
    }

    async fn get(&self, entry: &CatalogEntry, id: &Id) -> Result<Value, EngineError> {
        let items = self.items.lock().unwrap();
        items
            .get(&entry.kind())
            .into_iter()
            .flatten()
            .find(|(item_id, _)| item_id == id)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| EngineError::NotFound(format!("{} {id}", entry.kind())))
    }

    async fn create(&self, entry: &CatalogEntry, body: &Value) -> Result<Id, EngineError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = Id::new(format!("fake-{}", *next_id));
        self.items.lock().unwrap().entry(entry.kind()).or_default().push((id.clone(), body.clone()));
        Ok(id)
    }

    async fn update(&self, entry: &CatalogEntry, id: &Id, body: &Value) -> Result<(), EngineError> {
        let mut items = self.items.lock().unwrap();
        let Some(slot) = items.get_mut(&entry.kind()).and_then(|v| v.iter_mut().find(|(i, _)| i == id)) else {
            return Err(EngineError::NotFound(format!("{} {id}", entry.kind())));
        };
        slot.1 = body.clone();
        Ok(())
    }

    async fn delete(&self, entry: &CatalogEntry, id: &Id) -> Result<(), EngineError> {
        if self.conflicts.lock().unwrap().contains(id) {
            return Err(EngineError::Conflict(format!("{} {id} is still in use", entry.kind())));
        }
        let mut items = self.items.lock().unwrap();
        if let Some(v) = items.get_mut(&entry.kind()) {
            v.retain(|(item_id, _)| item_id != id);
        }
        Ok(())
    }

    async fn attachments(&self, template_id: &Id) -> Result<Vec<(Id, BTreeMap<String, String>)>, EngineError> {
        Ok(self.attached.lock().unwrap().get(template_id.as_str()).cloned().unwrap_or_default())
    }

    async fn vbond_configured(&self) -> Result<bool, EngineError> {
        Ok(*self.vbond.lock().unwrap())
    }

    async fn certificates_index(&self) -> Result<Value, EngineError> {
        Ok(Value::Array(Vec::new()))
    }

    async fn device_running_config(&self, _device_id: &Id) -> Result<String, EngineError> {
        Ok("! fake running config\n".to_string())
    }

    async fn controller_version(&self) -> Result<(u32, u32), EngineError> {
        Ok(self.version)
    }

    async fn list_devices(&self) -> Result<Vec<(Id, String, String)>, EngineError> {
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn run_device_action(
        &self,
        _category: ActionCategory,
        _template_id: &Id,
        _devices: Vec<ActionDevice>,
        _teardown: bool,
    ) -> Result<ActionOutcome, EngineError> {
        Ok(ActionOutcome::Success)
    }

    async fn activate_policy(&self, _policy_id: &Id, _deactivate: bool) -> Result<ActionOutcome, EngineError> {
        Ok(ActionOutcome::Success)
    }
}
