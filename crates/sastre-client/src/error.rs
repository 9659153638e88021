use reqwest::StatusCode;

/// Transport- and protocol-level failures talking to a controller. The
/// engine maps these onto its own error kinds (connection/auth/rate-limit/
/// not-found/conflict) rather than re-exposing this enum to callers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("authentication failed with status {0}")]
    Auth(StatusCode),

    #[error("rate limit exhausted after {retries} retries")]
    RateLimitExhausted { retries: u32 },

    #[error("{path} not found")]
    NotFound { path: String },

    #[error("conflict on {path}: {body}")]
    Conflict { path: String, body: String },

    #[error("{status} from {path}: {body}")]
    Status {
        status: StatusCode,
        path: String,
        body: String,
    },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("action {action_id} did not reach a terminal status within the timeout")]
    ActionTimeout { action_id: String },

    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
