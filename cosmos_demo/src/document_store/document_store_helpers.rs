use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use url::Url;

use crate::{configuration::MasterKey, cosmos_command::CosmosCommandVariant, CosmosError};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub enum DocumentStoreMessage {
    /// Executes the provided [`CosmosCommandVariant`] against the account endpoint.
    ExecuteCosmosCommand {
        command: CosmosCommandVariant,
        respond_to: oneshot::Sender<Result<CosmosResponse, CosmosError>>,
    },
}

/// A successful response from the service.
#[derive(Debug, Clone, PartialEq)]
pub struct CosmosResponse {
    /// Present on query responses when more pages are available.
    pub continuation: Option<String>,
    /// `None` when the service returned an empty body (e.g. deletes).
    pub body: Option<Value>,
}

/// Everything the [`DocumentStoreActor`](crate::DocumentStoreActor) needs to start.
#[derive(Debug)]
pub struct DocumentStoreInitialConfiguration {
    pub(crate) endpoint: Url,
    pub(crate) master_key: MasterKey,
    pub(crate) request_timeout: Duration,
}
