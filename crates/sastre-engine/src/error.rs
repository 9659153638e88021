use sastre_client::ClientError;
use sastre_model::Kind;

/// The engine's error kinds (spec.md §7). Transport, auth, and
/// configuration errors are fatal and abort the task; the rest are
/// item-local and accumulate into a task's failure report instead of
/// aborting it — callers match on this enum to decide which applies.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("authentication failed or session expired")]
    Auth,

    #[error("rate limit retries exhausted: {0}")]
    RateLimitExhausted(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("kind {0} is unsupported on the target controller's version")]
    VersionUnsupported(Kind),

    #[error("invalid backup: {0}")]
    InvalidBackup(String),

    #[error(transparent)]
    NameCollision(#[from] sastre_names::NameError),

    #[error("action {0} did not reach a terminal status before its timeout")]
    ActionTimeout(String),

    #[error("{kind} {name:?} references {target_kind} {target_name:?}, which could not be resolved")]
    DependencyUnresolved {
        kind: Kind,
        name: String,
        target_kind: Kind,
        target_name: String,
    },

    #[error(transparent)]
    InvalidTag(#[from] sastre_catalog::CatalogError),

    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("invalid argument: {0}")]
    InvalidArg(String),

    #[error(transparent)]
    Store(#[from] sastre_store::StoreError),

    #[error(transparent)]
    Graph(#[from] sastre_graph::GraphError),

    #[error(transparent)]
    Actions(#[from] sastre_actions::ActionsError),
}

impl From<ClientError> for EngineError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Connection(err) => EngineError::Connection(err.to_string()),
            ClientError::Auth(_) => EngineError::Auth,
            ClientError::RateLimitExhausted { retries } => {
                EngineError::RateLimitExhausted(format!("{retries} retries"))
            }
            ClientError::NotFound { path } => EngineError::NotFound(path),
            ClientError::Conflict { path, body } => EngineError::Conflict(format!("{path}: {body}")),
            ClientError::ActionTimeout { action_id } => EngineError::ActionTimeout(action_id),
            ClientError::Status { status, path, body } => {
                EngineError::Connection(format!("{status} from {path}: {body}"))
            }
            ClientError::Decode(err) => EngineError::InvalidBackup(err.to_string()),
            ClientError::InvalidUrl(err) => EngineError::InvalidArg(err.to_string()),
        }
    }
}
