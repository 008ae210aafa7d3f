use reqwest::StatusCode;
use serde::Deserialize;

use crate::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum CosmosError {
    #[error("Resource `{0}` was not found")]
    NotFound(String),
    #[error("Resource `{0}` already exists")]
    Conflict(String),
    #[error("{status} authorization failure, ensure the endpoint and primary key are correct: {message}")]
    BadAuthorization { status: StatusCode, message: String },
    #[error("{status} error occurred: {message}")]
    Service { status: StatusCode, message: String },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}
impl std::fmt::Debug for CosmosError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl CosmosError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CosmosError::NotFound(_))
    }

    /// The status code the service answered with, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CosmosError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            CosmosError::Conflict(_) => Some(StatusCode::CONFLICT),
            CosmosError::BadAuthorization { status, .. } | CosmosError::Service { status, .. } => {
                Some(*status)
            }
            CosmosError::UnexpectedError(_) => None,
        }
    }

    /// Maps a non-success response to an error. `resource` names what was addressed.
    pub(crate) async fn from_response(response: reqwest::Response, resource: &str) -> Self {
        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => CosmosError::NotFound(resource.to_string()),
            StatusCode::CONFLICT => CosmosError::Conflict(resource.to_string()),
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ServiceErrorBody>(&body)
                    .map(|b| b.message)
                    .unwrap_or(body);
                match status {
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        CosmosError::BadAuthorization { status, message }
                    }
                    _ => CosmosError::Service { status, message },
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[allow(dead_code)]
    code: Option<String>,
    message: String,
}
