use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

use crate::error::ClientError;
use crate::retry::{RateLimitBackoff, TransientBackoff};

/// One authenticated session to one controller. Single-tenant by default;
/// setting a tenant name sends it as the `VSessionId` header on every
/// request, scoping operations to that tenant (spec.md §4.A).
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    tenant: Option<String>,
    xsrf_token: RwLock<Option<String>>,
}

impl Client {
    /// Builds a client whose TLS verification is off by default — documented,
    /// explicit, because controllers routinely ship self-signed certificates
    /// (spec.md §4.A). `timeout` is the global per-HTTP-call deadline
    /// (spec.md §5), applied to every request this client sends.
    pub fn new(base_url: Url, tenant: Option<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Client {
            base_url,
            http,
            tenant,
            xsrf_token: RwLock::new(None),
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let url = self.base_url.join("j_security_check")?;
        let response = self
            .http
            .post(url)
            .form(&[("j_username", username), ("j_password", password)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ClientError::Auth(response.status()));
        }
        // vManage rejects a bad login with 200 + an HTML error page rather
        // than a 4xx, so a session cookie alone doesn't prove success; the
        // token fetch below is the real auth check — it 403s without a
        // valid session.
        let token_url = self.base_url.join("dataservice/client/token")?;
        let token_response = self.http.get(token_url).send().await?;
        if token_response.status() == StatusCode::FORBIDDEN {
            return Err(ClientError::Auth(StatusCode::FORBIDDEN));
        }
        let token = token_response.error_for_status()?.text().await?;
        *self.xsrf_token.write().await = Some(token);
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let url = self.base_url.join("logout")?;
        self.http.get(url).query(&[("nocache", "1")]).send().await?;
        *self.xsrf_token.write().await = None;
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let value = self.request_with_retry(Method::GET, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let value = self
            .request_with_retry(Method::POST, path, Some(serde_json::to_value(body)?))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let value = self
            .request_with_retry(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request_with_retry(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Sends one logical request, retrying per spec.md §4.A: 429s get an
    /// adaptive exponential backoff (cap 60s, 5 tries); transient network
    /// errors get linear backoff (3 tries); 401/403 surface immediately.
    async fn request_with_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let mut rate_limit = RateLimitBackoff::new();
        let mut transient = TransientBackoff::new();

        loop {
            match self.send_once(method.clone(), path, body.as_ref()).await {
                Ok(value) => return Ok(value),
                Err(ClientError::Status { status, .. })
                    if status == StatusCode::TOO_MANY_REQUESTS =>
                {
                    match rate_limit.next_delay() {
                        Some(delay) => {
                            tracing::warn!(path, attempt = rate_limit.attempts(), "rate limited, backing off");
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            return Err(ClientError::RateLimitExhausted {
                                retries: rate_limit.attempts(),
                            })
                        }
                    }
                }
                Err(ClientError::Connection(e)) => {
                    match transient.next_delay() {
                        Some(delay) => {
                            tracing::warn!(path, error = %e, "transient network error, retrying");
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(ClientError::Connection(e)),
                    }
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = self.base_url.join(path)?;
        let mut builder = self.http.request(method, url);

        if let Some(tenant) = &self.tenant {
            builder = builder.header("VSessionId", tenant);
        }
        if let Some(token) = self.xsrf_token.read().await.as_ref() {
            builder = builder.header("X-XSRF-TOKEN", token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Auth(status));
        }
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(Value::Null);
            }
            let text = response.text().await?;
            if text.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }

        let body_text = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ClientError::NotFound { path: path.to_string() }),
            StatusCode::CONFLICT => Err(ClientError::Conflict {
                path: path.to_string(),
                body: body_text,
            }),
            _ => Err(ClientError::Status {
                status,
                path: path.to_string(),
                body: body_text,
            }),
        }
    }

}

/// Default interval between `poll_action` status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Default overall timeout for a long-running action to reach a terminal state.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(20 * 60);
/// Default global deadline for a single HTTP call (spec.md §5).
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(300);
