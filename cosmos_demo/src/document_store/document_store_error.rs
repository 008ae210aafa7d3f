use crate::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum DocumentStoreError {
    #[error("No endpoint was supplied and a document store can't exist without one")]
    MissingEndpointError,
    #[error("No primary key was supplied and requests can't be authorized without one")]
    MissingMasterKeyError,
    #[error("The primary key is not valid base64")]
    InvalidMasterKeyError,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}
impl std::fmt::Debug for DocumentStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
