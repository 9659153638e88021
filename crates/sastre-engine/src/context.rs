use sastre_catalog::Catalog;
use sastre_client::ConnectionConfig;

use crate::controller::ControllerApi;
use crate::error::EngineError;

/// Everything a task needs to run once: an authenticated controller
/// connection, the catalog, and the controller's reported version (used
/// for catalog filtering, spec.md §4.B).
pub struct EngineContext {
    pub controller: Box<dyn ControllerApi>,
    pub catalog: Catalog,
    pub controller_version: (u32, u32),
}

impl EngineContext {
    /// Logs in per `config` and fetches the controller's version to filter
    /// the catalog by. `config` is produced by whatever outer layer owns
    /// argv/env parsing (spec.md §6) — the engine never reads either itself.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, EngineError> {
        let client = config.connect().await?;
        let controller_version = client.controller_version().await?;
        tracing::info!(major = controller_version.0, minor = controller_version.1, "connected to controller");
        Ok(EngineContext {
            controller: Box::new(client),
            catalog: Catalog::new(),
            controller_version,
        })
    }

    /// Builds a context around an already-constructed controller (a live
    /// `Client`, or a test fake), skipping login.
    pub fn with_controller(controller: Box<dyn ControllerApi>, controller_version: (u32, u32)) -> Self {
        EngineContext {
            controller,
            catalog: Catalog::new(),
            controller_version,
        }
    }
}
