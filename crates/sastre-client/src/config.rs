use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::client::{Client, DEFAULT_HTTP_TIMEOUT};
use crate::error::ClientError;

/// Everything a `Client` needs to reach one controller, supplied by
/// whatever outer layer owns argv/env parsing (spec.md §6 "Address, user,
/// password, port, tenant, timeout are inputs supplied by an outer CLI").
/// The engine only ever consumes this struct — it never reads environment
/// variables or parses command-line flags itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT.as_secs()
}

impl ConnectionConfig {
    pub fn base_url(&self) -> Result<Url, ClientError> {
        Url::parse(&format!("https://{}:{}/dataservice/", self.address, self.port)).map_err(ClientError::InvalidUrl)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds and logs in a `Client` from this config in one step.
    pub async fn connect(&self) -> Result<Client, ClientError> {
        let client = Client::new(self.base_url()?, self.tenant.clone(), self.timeout())?;
        client.login(&self.username, &self.password).await?;
        Ok(client)
    }
}
