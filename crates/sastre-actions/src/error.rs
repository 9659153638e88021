#[derive(Debug, thiserror::Error)]
pub enum ActionsError {
    #[error("action submission failed: {0}")]
    Submit(#[from] sastre_client::ClientError),
}
