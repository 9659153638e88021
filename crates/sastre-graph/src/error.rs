#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("unknown kind encountered while building the reference graph: {0}")]
    UnknownKind(#[from] sastre_catalog::CatalogError),
}
