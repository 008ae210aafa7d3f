use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::{
    cosmos_command::{CosmosCommandVariant, QuerySpec},
    CosmosError, DocumentStore,
};

use super::{strip_system_properties, DocumentContainer};

/// A container in a Cosmos DB account, reached through a [`DocumentStore`].
#[derive(Clone, Debug)]
pub struct CosmosContainer {
    store: DocumentStore,
    database: String,
    container: String,
    partition_key_path: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryPage {
    #[serde(rename = "Documents", default)]
    documents: Vec<Value>,
}

impl CosmosContainer {
    pub fn new(
        store: DocumentStore,
        database: impl Into<String>,
        container: impl Into<String>,
        partition_key_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            database: database.into(),
            container: container.into(),
            partition_key_path: partition_key_path.into(),
        }
    }
}

#[async_trait]
impl DocumentContainer for CosmosContainer {
    fn name(&self) -> &str {
        &self.container
    }

    #[instrument(level = "debug", skip(self), fields(database = %self.database, container = %self.container))]
    async fn create_if_not_exists(&self) -> Result<(), CosmosError> {
        self.store
            .create_database_if_not_exists(&self.database)
            .await?;
        self.store
            .create_container_if_not_exists(&self.database, &self.container, &self.partition_key_path)
            .await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self), fields(container = %self.container))]
    async fn read_item(&self, id: &str, partition_key: &str) -> Result<Option<Value>, CosmosError> {
        let command = CosmosCommandVariant::ReadItem {
            database: self.database.clone(),
            container: self.container.clone(),
            id: id.to_string(),
            partition_key: partition_key.to_string(),
        };
        match self.store.execute_cosmos_command(command).await {
            Ok(response) => Ok(response.body.map(strip_system_properties)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(level = "debug", skip(self, item), fields(container = %self.container))]
    async fn create_item(&self, partition_key: &str, item: Value) -> Result<Value, CosmosError> {
        let command = CosmosCommandVariant::CreateItem {
            database: self.database.clone(),
            container: self.container.clone(),
            partition_key: partition_key.to_string(),
            body: item,
        };
        let response = self.store.execute_cosmos_command(command).await?;
        response
            .body
            .map(strip_system_properties)
            .context("Service returned an empty body for a created item")
            .map_err(CosmosError::from)
    }

    #[instrument(level = "debug", skip(self, item), fields(container = %self.container))]
    async fn replace_item(
        &self,
        id: &str,
        partition_key: &str,
        item: Value,
    ) -> Result<Value, CosmosError> {
        let command = CosmosCommandVariant::ReplaceItem {
            database: self.database.clone(),
            container: self.container.clone(),
            id: id.to_string(),
            partition_key: partition_key.to_string(),
            body: item,
        };
        let response = self.store.execute_cosmos_command(command).await?;
        response
            .body
            .map(strip_system_properties)
            .context("Service returned an empty body for a replaced item")
            .map_err(CosmosError::from)
    }

    #[instrument(level = "debug", skip(self), fields(container = %self.container))]
    async fn delete_item(&self, id: &str, partition_key: &str) -> Result<(), CosmosError> {
        let command = CosmosCommandVariant::DeleteItem {
            database: self.database.clone(),
            container: self.container.clone(),
            id: id.to_string(),
            partition_key: partition_key.to_string(),
        };
        self.store.execute_cosmos_command(command).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self), fields(container = %self.container))]
    async fn query_items(&self, query: &QuerySpec) -> Result<Vec<Value>, CosmosError> {
        let mut documents = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages = 0;

        loop {
            let command = CosmosCommandVariant::QueryItems {
                database: self.database.clone(),
                container: self.container.clone(),
                query: query.clone(),
                continuation: continuation.take(),
            };
            let response = self.store.execute_cosmos_command(command).await?;
            pages += 1;

            let page = match response.body {
                Some(body) => serde_json::from_value::<QueryPage>(body)
                    .context("Unable to deserialize query results")?,
                None => QueryPage::default(),
            };
            documents.extend(page.documents.into_iter().map(strip_system_properties));

            match response.continuation {
                Some(token) if !token.is_empty() => continuation = Some(token),
                _ => break,
            }
        }

        tracing::debug!(pages, results = documents.len(), "Query complete");
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        container::DocumentContainer, cosmos_command::QuerySpec, CosmosError, DocumentStore,
    };

    use super::CosmosContainer;

    const KEY: &str = "AAAAAAAAAAAAAAAAAAAAAA==";

    fn container_for(server: &MockServer) -> CosmosContainer {
        let store = DocumentStore::builder()
            .set_endpoint(&server.uri())
            .set_master_key(KEY)
            .build()
            .unwrap();
        CosmosContainer::new(store, "Db", "ApiRequest", "/partitionKey")
    }

    #[tokio::test]
    async fn read_item_returns_none_for_not_found() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dbs/Db/colls/ApiRequest/docs/r1"))
            .and(header("x-ms-documentdb-partitionkey", "[\"pk\"]"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": "NotFound",
                "message": "Entity with the specified id does not exist in the system."
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let item = container_for(&server).read_item("r1", "pk").await.unwrap();

        // Assert
        assert!(item.is_none());
    }

    #[tokio::test]
    async fn read_item_strips_system_properties() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dbs/Db/colls/ApiRequest/docs/r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "r1",
                "partitionKey": "pk",
                "_rid": "AAAA",
                "_etag": "\"1\"",
                "_ts": 1700000000
            })))
            .mount(&server)
            .await;

        // Act
        let item = container_for(&server).read_item("r1", "pk").await.unwrap();

        // Assert
        assert_eq!(item, Some(json!({ "id": "r1", "partitionKey": "pk" })));
    }

    #[tokio::test]
    async fn create_item_posts_document_to_partition() {
        // Arrange
        let server = MockServer::start().await;
        let document = json!({ "id": "r1", "partitionKey": "pk", "path": "/v1" });
        Mock::given(method("POST"))
            .and(path("/dbs/Db/colls/ApiRequest/docs"))
            .and(header("x-ms-documentdb-partitionkey", "[\"pk\"]"))
            .and(body_json(document.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(document.clone()))
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let created = container_for(&server)
            .create_item("pk", document.clone())
            .await
            .unwrap();

        // Assert
        assert_eq!(created, document);
    }

    #[tokio::test]
    async fn create_item_reports_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let result = container_for(&server)
            .create_item("pk", json!({ "id": "r1", "partitionKey": "pk" }))
            .await;

        assert!(matches!(result, Err(CosmosError::Conflict(_))));
    }

    #[tokio::test]
    async fn delete_item_accepts_empty_no_content_response() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/dbs/Db/colls/ApiRequest/docs/r1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        assert!(container_for(&server).delete_item("r1", "pk").await.is_ok());
    }

    #[tokio::test]
    async fn query_items_follows_continuation_tokens() {
        // Arrange
        let server = MockServer::start().await;
        // Mounted first so it wins for the follow-up request carrying the token.
        Mock::given(method("POST"))
            .and(path("/dbs/Db/colls/ApiRequest/docs"))
            .and(header("x-ms-continuation", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Documents": [{ "id": "r2", "partitionKey": "b", "_ts": 2 }],
                "_count": 1
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/dbs/Db/colls/ApiRequest/docs"))
            .and(header("x-ms-documentdb-isquery", "True"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ms-continuation", "page-2")
                    .set_body_json(json!({
                        "Documents": [{ "id": "r1", "partitionKey": "a", "_ts": 1 }],
                        "_count": 1
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        // Act
        let items = container_for(&server)
            .query_items(&QuerySpec::new("SELECT * FROM c"))
            .await
            .unwrap();

        // Assert
        assert_eq!(
            items,
            vec![
                json!({ "id": "r1", "partitionKey": "a" }),
                json!({ "id": "r2", "partitionKey": "b" })
            ]
        );
    }
}
