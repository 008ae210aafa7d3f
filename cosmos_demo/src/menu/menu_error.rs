use reqwest::StatusCode;

use crate::{error_chain_fmt, repositories::RepositoryError, CosmosError};

#[derive(thiserror::Error)]
pub enum MenuError {
    #[error("Unable to use the terminal")]
    Terminal(#[from] std::io::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
impl std::fmt::Debug for MenuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl MenuError {
    /// The service fault behind this error, as a status code and the service's message.
    pub fn service_fault(&self) -> Option<(StatusCode, String)> {
        match self {
            MenuError::Repository(RepositoryError::Store(e)) => match e {
                CosmosError::Service { status, message }
                | CosmosError::BadAuthorization { status, message } => {
                    Some((*status, message.clone()))
                }
                other => other.status().map(|status| (status, other.to_string())),
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use reqwest::StatusCode;

    use crate::{repositories::RepositoryError, CosmosError};

    use super::MenuError;

    #[test]
    fn service_fault_exposes_status_and_message() {
        let error = MenuError::from(RepositoryError::from(CosmosError::Service {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "Request rate is large".to_string(),
        }));

        assert_eq!(
            error.service_fault(),
            Some((
                StatusCode::TOO_MANY_REQUESTS,
                "Request rate is large".to_string()
            ))
        );
    }

    #[test]
    fn service_fault_keeps_forbidden_status_and_message() {
        let error = MenuError::from(RepositoryError::from(CosmosError::BadAuthorization {
            status: StatusCode::FORBIDDEN,
            message: "Storage quota for 'Document' exceeded".to_string(),
        }));

        assert_eq!(
            error.service_fault(),
            Some((
                StatusCode::FORBIDDEN,
                "Storage quota for 'Document' exceeded".to_string()
            ))
        );
    }

    #[test]
    fn service_fault_is_none_for_terminal_errors() {
        let error = MenuError::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "closed",
        ));

        assert_eq!(error.service_fault(), None);
    }
}
