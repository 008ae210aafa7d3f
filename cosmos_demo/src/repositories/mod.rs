mod api_request_repository;
mod application_repository;
mod repository_base;
mod repository_error;

pub use api_request_repository::*;
pub use application_repository::*;
pub use repository_base::*;
pub use repository_error::*;

/// Collection holding [`Application`](crate::models::Application) documents.
pub const APPLICATION_COLLECTION: &str = "Application";
/// Collection holding [`ApiRequest`](crate::models::ApiRequest) documents.
pub const API_REQUEST_COLLECTION: &str = "ApiRequest";
