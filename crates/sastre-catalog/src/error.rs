use sastre_model::{Kind, Tag};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown tag {0:?}")]
    InvalidTag(Tag),

    #[error("unknown kind {0:?}")]
    UnknownKind(Kind),

    #[error("reference site for kind {kind:?} points at a pointer with no value: {pointer}")]
    DanglingPointer { kind: Kind, pointer: String },
}
