use std::sync::Arc;

use tracing::instrument;

use crate::{
    configuration::Settings, container::DocumentContainer, models::ApiRequest, DocumentStore,
};

use super::{RepositoryBase, RepositoryError};

#[derive(Clone, Debug)]
pub struct ApiRequestRepository {
    base: RepositoryBase,
}

impl ApiRequestRepository {
    pub fn new(settings: &Settings, collection_name: &str) -> Result<Self, RepositoryError> {
        Ok(Self {
            base: RepositoryBase::new(settings, collection_name)?,
        })
    }

    pub fn from_store(store: DocumentStore, database_name: &str, collection_name: &str) -> Self {
        Self {
            base: RepositoryBase::from_store(store, database_name, collection_name),
        }
    }

    pub fn in_memory(collection_name: &str) -> Self {
        Self {
            base: RepositoryBase::in_memory(collection_name),
        }
    }

    pub fn with_container(container: Arc<dyn DocumentContainer>) -> Self {
        Self {
            base: RepositoryBase::with_container(container),
        }
    }

    pub async fn initialise(&self) -> Result<(), RepositoryError> {
        self.base.initialise().await
    }

    pub fn container(&self) -> &Arc<dyn DocumentContainer> {
        self.base.container()
    }

    pub fn dispose(self) {
        self.base.dispose()
    }

    /// Returns the stored request with this id, creating it first if there is none.
    ///
    /// This is a read followed by a create, not an atomic upsert. Two callers racing on
    /// the same id can both miss the read; the loser gets a conflict error.
    #[instrument(level = "info", name = "Create Api Request", skip(self, request), fields(id = %request.id))]
    pub async fn create_api_request(
        &self,
        request: ApiRequest,
    ) -> Result<ApiRequest, RepositoryError> {
        if let Some(existing) = self
            .base
            .read::<ApiRequest>(&request.id, &request.partition_key)
            .await?
        {
            tracing::debug!("Api request already exists, returning stored record");
            return Ok(existing);
        }

        let created = self.base.create(&request.partition_key, &request).await?;
        tracing::info!("Api request created");
        Ok(created)
    }
}
