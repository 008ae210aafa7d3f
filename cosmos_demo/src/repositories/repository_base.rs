use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::instrument;

use crate::{
    configuration::Settings,
    container::{CosmosContainer, DocumentContainer, InMemoryContainer},
    cosmos_command::QuerySpec,
    models::PARTITION_KEY_PATH,
    DocumentStore, DocumentStoreBuilder,
};

use super::RepositoryError;

/// Binds a collection to a container and provides typed access to its items.
#[derive(Clone, Debug)]
pub struct RepositoryBase {
    container: Arc<dyn DocumentContainer>,
}

impl RepositoryBase {
    /// Opens a client of its own to the account in `settings` for the named collection.
    ///
    /// Nothing is sent to the service until [`initialise`](Self::initialise) is called.
    /// Must be called from within a tokio runtime. Prefer [`from_store`](Self::from_store)
    /// when several repositories talk to the same account.
    #[instrument(level = "debug", name = "Open Repository", skip(settings))]
    pub fn new(settings: &Settings, collection_name: &str) -> Result<Self, RepositoryError> {
        let store = DocumentStoreBuilder::from_settings(settings).build()?;
        Ok(Self::from_store(
            store,
            &settings.database_name,
            collection_name,
        ))
    }

    /// Binds the named collection to an existing store handle.
    pub fn from_store(store: DocumentStore, database_name: &str, collection_name: &str) -> Self {
        let container =
            CosmosContainer::new(store, database_name, collection_name, PARTITION_KEY_PATH);
        Self::with_container(Arc::new(container))
    }

    pub fn in_memory(collection_name: &str) -> Self {
        Self::with_container(Arc::new(InMemoryContainer::new(collection_name)))
    }

    pub fn with_container(container: Arc<dyn DocumentContainer>) -> Self {
        Self { container }
    }

    /// Ensures the database and container exist. Idempotent.
    #[instrument(level = "info", name = "Initialise Repository", skip(self), fields(collection = %self.container.name()))]
    pub async fn initialise(&self) -> Result<(), RepositoryError> {
        self.container.create_if_not_exists().await?;
        Ok(())
    }

    pub fn container(&self) -> &Arc<dyn DocumentContainer> {
        &self.container
    }

    /// Releases this repository's handle on the connection.
    pub fn dispose(self) {
        tracing::debug!("Disposing repository for `{}`", self.container.name());
        drop(self.container);
    }

    pub(crate) async fn read<T: DeserializeOwned>(
        &self,
        id: &str,
        partition_key: &str,
    ) -> Result<Option<T>, RepositoryError> {
        match self.container.read_item(id, partition_key).await? {
            Some(item) => Ok(Some(serde_json::from_value(item)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn create<T: Serialize + DeserializeOwned>(
        &self,
        partition_key: &str,
        item: &T,
    ) -> Result<T, RepositoryError> {
        let created = self
            .container
            .create_item(partition_key, serde_json::to_value(item)?)
            .await?;
        Ok(serde_json::from_value(created)?)
    }

    pub(crate) async fn replace<T: Serialize + DeserializeOwned>(
        &self,
        id: &str,
        partition_key: &str,
        item: &T,
    ) -> Result<T, RepositoryError> {
        let replaced = self
            .container
            .replace_item(id, partition_key, serde_json::to_value(item)?)
            .await?;
        Ok(serde_json::from_value(replaced)?)
    }

    pub(crate) async fn query<T: DeserializeOwned>(
        &self,
        query: &QuerySpec,
    ) -> Result<Vec<T>, RepositoryError> {
        self.container
            .query_items(query)
            .await?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(RepositoryError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use url::Url;

    use crate::{
        configuration::{MasterKey, Settings},
        DocumentStore,
    };

    use super::RepositoryBase;

    const KEY: &str = "AAAAAAAAAAAAAAAAAAAAAA==";

    #[tokio::test]
    async fn new_binds_collection_to_a_cosmos_container() {
        // Arrange
        let settings = Settings {
            endpoint_uri: Url::parse("https://localhost:8081/").unwrap(),
            primary_key: MasterKey::parse(KEY).unwrap(),
            database_name: "Db".to_string(),
        };

        // Act
        let repository = RepositoryBase::new(&settings, "Application").unwrap();

        // Assert
        assert_eq!(repository.container().name(), "Application");
    }

    #[tokio::test]
    async fn from_store_shares_one_store_between_collections() {
        // Arrange
        let store = DocumentStore::builder()
            .set_endpoint("https://localhost:8081")
            .set_master_key(KEY)
            .build()
            .unwrap();

        // Act
        let applications = RepositoryBase::from_store(store.clone(), "Db", "Application");
        let api_requests = RepositoryBase::from_store(store, "Db", "ApiRequest");

        // Assert
        assert_eq!(applications.container().name(), "Application");
        assert_eq!(api_requests.container().name(), "ApiRequest");
    }
}
