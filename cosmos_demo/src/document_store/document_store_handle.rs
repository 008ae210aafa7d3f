use anyhow::Context;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

use crate::{
    cosmos_command::CosmosCommandVariant, run_document_store_actor, CosmosError, CosmosResponse,
    DocumentStoreActor, DocumentStoreBuilder, DocumentStoreError,
    DocumentStoreInitialConfiguration, DocumentStoreMessage,
};

/**
This a handle to the actor.

Only one DocumentStoreActor should exist per account when possible to reduce resource
usage. Cloning this handle is very cheap and will not instantiate a new actor in the background.
It is recommended to clone this handle to each component that needs to talk to the service.
When the last handle goes out of scope and is dropped, the backing actor stops.

```rust
# tokio_test::block_on(async {
use cosmos_demo::DocumentStore;

let document_store: DocumentStore = DocumentStore::builder()
    .set_endpoint("https://localhost:8081")
    .set_master_key("AAAAAAAAAAAAAAAAAAAAAA==")
    .build()
    .unwrap();

// Talks to the same actor as `document_store`.
let _another_handle = document_store.clone();
# })
```
*/
#[derive(Clone, Debug)]
pub struct DocumentStore {
    sender: mpsc::Sender<DocumentStoreMessage>,
}

impl DocumentStore {
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::default()
    }

    // This is pub(crate) so only the builder can crank it out
    pub(crate) fn new(
        initial_config: DocumentStoreInitialConfiguration,
    ) -> Result<Self, DocumentStoreError> {
        let (sender, receiver) = mpsc::channel(8);
        let actor = DocumentStoreActor::new(receiver, initial_config)?;
        tokio::spawn(run_document_store_actor(actor));

        Ok(Self { sender })
    }

    #[instrument(
        level = "debug",
        name = "Actor Handle - Execute Cosmos Command",
        skip(self)
    )]
    pub async fn execute_cosmos_command(
        &self,
        command: CosmosCommandVariant,
    ) -> Result<CosmosResponse, CosmosError> {
        tracing::trace!("Creating oneshot channel");
        let (tx, rx) = oneshot::channel();

        tracing::trace!("Sending message to actor");
        self.sender
            .send(DocumentStoreMessage::ExecuteCosmosCommand {
                command,
                respond_to: tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("DocumentStoreActor task has been killed"))?;

        tracing::trace!("Waiting for oneshot to return");
        rx.await.context("DocumentStoreActor task has been killed")?
    }

    /// Creates the database unless it already exists. Returns `true` when it was created.
    #[instrument(level = "info", name = "Create Database If Not Exists", skip(self))]
    pub async fn create_database_if_not_exists(&self, database: &str) -> Result<bool, CosmosError> {
        let command = CosmosCommandVariant::CreateDatabase {
            database: database.to_string(),
        };
        created_or_existing(self.execute_cosmos_command(command).await)
    }

    /// Creates the container with a hash partition on `partition_key_path` unless it
    /// already exists. Returns `true` when it was created.
    #[instrument(level = "info", name = "Create Container If Not Exists", skip(self))]
    pub async fn create_container_if_not_exists(
        &self,
        database: &str,
        container: &str,
        partition_key_path: &str,
    ) -> Result<bool, CosmosError> {
        let command = CosmosCommandVariant::CreateContainer {
            database: database.to_string(),
            container: container.to_string(),
            partition_key_path: partition_key_path.to_string(),
        };
        created_or_existing(self.execute_cosmos_command(command).await)
    }
}

fn created_or_existing(result: Result<CosmosResponse, CosmosError>) -> Result<bool, CosmosError> {
    match result {
        Ok(response) => {
            let id = response
                .body
                .as_ref()
                .and_then(|b| b.get("id"))
                .and_then(Value::as_str)
                .unwrap_or("resource");
            tracing::info!("Created {}", id);
            Ok(true)
        }
        Err(CosmosError::Conflict(resource)) => {
            tracing::debug!("{} already exists", resource);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, header_exists, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use reqwest::StatusCode;

    use crate::{menu::MenuError, repositories::RepositoryError, CosmosError, DocumentStore};

    const KEY: &str = "AAAAAAAAAAAAAAAAAAAAAA==";

    fn store_for(server: &MockServer) -> DocumentStore {
        DocumentStore::builder()
            .set_endpoint(&server.uri())
            .set_master_key(KEY)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn create_database_if_not_exists_posts_database_id() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dbs"))
            .and(header("x-ms-version", "2018-12-31"))
            .and(header_exists("authorization"))
            .and(header_exists("x-ms-date"))
            .and(body_json(json!({ "id": "Db" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "Db" })))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let created = store_for(&server)
            .create_database_if_not_exists("Db")
            .await
            .unwrap();

        // Assert
        assert!(created);
    }

    #[tokio::test]
    async fn create_container_if_not_exists_treats_conflict_as_existing() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dbs/Db/colls"))
            .and(body_json(json!({
                "id": "Application",
                "partitionKey": { "paths": ["/partitionKey"], "kind": "Hash" }
            })))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "Conflict",
                "message": "Resource with specified id, name, or unique index already exists."
            })))
            .mount(&server)
            .await;

        // Act
        let created = store_for(&server)
            .create_container_if_not_exists("Db", "Application", "/partitionKey")
            .await
            .unwrap();

        // Assert
        assert!(!created);
    }

    #[tokio::test]
    async fn execute_cosmos_command_maps_service_faults_with_status_and_message() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dbs"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "code": "TooManyRequests",
                "message": "Request rate is large"
            })))
            .mount(&server)
            .await;

        // Act
        let result = store_for(&server).create_database_if_not_exists("Db").await;

        // Assert
        match result {
            Err(CosmosError::Service { status, message }) => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(message, "Request rate is large");
            }
            other => panic!("expected a service error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn execute_cosmos_command_maps_unauthorized_to_bad_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = store_for(&server).create_database_if_not_exists("Db").await;

        assert!(matches!(
            result,
            Err(CosmosError::BadAuthorization { status, .. }) if status.as_u16() == 401
        ));
    }

    #[tokio::test]
    async fn execute_cosmos_command_keeps_forbidden_status_and_message() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dbs"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "Forbidden",
                "message": "Storage quota for 'Document' exceeded"
            })))
            .mount(&server)
            .await;

        // Act
        let error = store_for(&server)
            .create_database_if_not_exists("Db")
            .await
            .unwrap_err();

        // Assert
        assert_eq!(error.status().map(|s| s.as_u16()), Some(403));
        let fault = MenuError::from(RepositoryError::from(error)).service_fault();
        assert_eq!(
            fault,
            Some((
                StatusCode::FORBIDDEN,
                "Storage quota for 'Document' exceeded".to_string()
            ))
        );
    }
}
