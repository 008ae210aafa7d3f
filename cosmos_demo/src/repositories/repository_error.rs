use crate::{error_chain_fmt, CosmosError, DocumentStoreError};

#[derive(thiserror::Error)]
pub enum RepositoryError {
    #[error("Application `{0}` was not found")]
    ApplicationNotFound(String),
    #[error("Api key `{value}` was not found on application `{app_id}`")]
    ApiKeyNotFound { app_id: String, value: String },
    #[error("Application `{app_id}` already has an api key with value `{value}`")]
    DuplicateApiKey { app_id: String, value: String },
    #[error("Unable to connect to the document store")]
    Connection(#[from] DocumentStoreError),
    #[error(transparent)]
    Store(#[from] CosmosError),
    #[error("Unable to convert document")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}
impl std::fmt::Debug for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl RepositoryError {
    /// Absence of something the caller asked for, as opposed to a failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            RepositoryError::ApplicationNotFound(_) | RepositoryError::ApiKeyNotFound { .. } => {
                true
            }
            RepositoryError::Store(e) => e.is_not_found(),
            _ => false,
        }
    }
}
