use tracing::instrument;
use url::Url;

use crate::{
    configuration::{MasterKey, Settings},
    DocumentStore, DocumentStoreError, DocumentStoreInitialConfiguration, DEFAULT_REQUEST_TIMEOUT,
};

#[derive(Debug, Default)]
pub struct DocumentStoreBuilder {
    endpoint: Option<String>,
    master_key: Option<String>,
}

impl DocumentStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the builder from loaded [`Settings`].
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .set_endpoint(settings.endpoint_uri.as_str())
            .set_master_key(settings.primary_key.expose())
    }

    pub fn set_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn set_master_key(mut self, master_key: &str) -> Self {
        self.master_key = Some(master_key.to_string());
        self
    }

    /// Initializes a new [`DocumentStoreActor`](crate::DocumentStoreActor) and returns a handle to it.
    ///
    /// Each call to this will create a new actor. It is not recommended to create more
    /// than one per account; clone the returned handle instead. The builder may be called
    /// more than once so it can act as a template after being set up once.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(level = "debug", name = "Build DocumentStoreBuilder", skip(self))]
    pub fn build(&self) -> Result<DocumentStore, DocumentStoreError> {
        let endpoint = match &self.endpoint {
            Some(endpoint) => validate_endpoint(endpoint)?,
            None => {
                tracing::error!("No endpoint was supplied");
                return Err(DocumentStoreError::MissingEndpointError);
            }
        };

        let master_key = match &self.master_key {
            Some(key) => {
                MasterKey::parse(key).map_err(|_| DocumentStoreError::InvalidMasterKeyError)?
            }
            None => return Err(DocumentStoreError::MissingMasterKeyError),
        };

        let initial_config = DocumentStoreInitialConfiguration {
            endpoint,
            master_key,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        };

        tracing::trace!("Initial Configuration: {:?}", &initial_config);

        DocumentStore::new(initial_config)
    }
}

/// Parses the account endpoint, ensuring it is http(s) and usable as a base for paths.
#[instrument(level = "debug", name = "Validate Endpoint")]
fn validate_endpoint(endpoint: &str) -> anyhow::Result<Url> {
    let url = Url::parse(endpoint)?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow::anyhow!("Url does not have correct scheme: {}", url));
    }
    if url.cannot_be_a_base() {
        return Err(anyhow::anyhow!("Url cannot be used as a base: {}", url));
    }

    Ok(url)
}
