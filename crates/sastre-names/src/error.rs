use sastre_model::Kind;

#[derive(Debug, thiserror::Error)]
pub enum NameError {
    #[error("invalid name template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("name collision in kind {kind:?}: {offenders:?} all transform to {new_name:?}")]
    NameCollision {
        kind: Kind,
        new_name: String,
        offenders: Vec<String>,
    },
}
