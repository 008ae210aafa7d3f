//! Cosmos commands are the only way this crate talks to the service.
//!
//! Each [`CosmosCommandVariant`] knows its HTTP verb, the path it is sent to, and
//! the resource type and resource link it is signed with. The document store
//! actor wraps a variant in a [`CosmosCommand`] carrying the account endpoint and
//! turns it into a signed [`reqwest::Request`].
use chrono::{DateTime, Utc};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::{configuration::MasterKey, format_ms_date, master_key_authorization};

pub const API_VERSION: &str = "2018-12-31";

pub const HEADER_CONTINUATION: &str = "x-ms-continuation";
pub const HEADER_REQUEST_CHARGE: &str = "x-ms-request-charge";
pub const HEADER_PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";

#[derive(Debug)]
pub struct CosmosCommand {
    pub base_server_url: Url,
    pub command: CosmosCommandVariant,
}

/// Represents every operation that can be sent to the service.
#[derive(Debug, Clone, PartialEq)]
pub enum CosmosCommandVariant {
    CreateDatabase {
        database: String,
    },
    CreateContainer {
        database: String,
        container: String,
        partition_key_path: String,
    },
    ReadItem {
        database: String,
        container: String,
        id: String,
        partition_key: String,
    },
    CreateItem {
        database: String,
        container: String,
        partition_key: String,
        body: Value,
    },
    ReplaceItem {
        database: String,
        container: String,
        id: String,
        partition_key: String,
        body: Value,
    },
    DeleteItem {
        database: String,
        container: String,
        id: String,
        partition_key: String,
    },
    QueryItems {
        database: String,
        container: String,
        query: QuerySpec,
        continuation: Option<String>,
    },
}

/// A parameterised SQL query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySpec {
    pub query: String,
    pub parameters: Vec<QueryParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParameter {
    pub name: String,
    pub value: Value,
}

impl QuerySpec {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push(QueryParameter {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Builds `SELECT * FROM c WHERE c.{field} = @{field}`.
    pub fn field_equals(field: &str, value: impl Into<Value>) -> Self {
        Self::new(format!("SELECT * FROM c WHERE c.{0} = @{0}", field))
            .with_parameter(format!("@{}", field), value)
    }
}

impl CosmosCommandVariant {
    pub fn method(&self) -> Method {
        match self {
            CosmosCommandVariant::ReadItem { .. } => Method::GET,
            CosmosCommandVariant::ReplaceItem { .. } => Method::PUT,
            CosmosCommandVariant::DeleteItem { .. } => Method::DELETE,
            CosmosCommandVariant::CreateDatabase { .. }
            | CosmosCommandVariant::CreateContainer { .. }
            | CosmosCommandVariant::CreateItem { .. }
            | CosmosCommandVariant::QueryItems { .. } => Method::POST,
        }
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            CosmosCommandVariant::CreateDatabase { .. } => "dbs",
            CosmosCommandVariant::CreateContainer { .. } => "colls",
            _ => "docs",
        }
    }

    /// Path segments below the account endpoint. Unencoded; [`Url`] encodes them.
    fn path_segments(&self) -> Vec<&str> {
        match self {
            CosmosCommandVariant::CreateDatabase { .. } => vec!["dbs"],
            CosmosCommandVariant::CreateContainer { database, .. } => {
                vec!["dbs", database.as_str(), "colls"]
            }
            CosmosCommandVariant::CreateItem {
                database,
                container,
                ..
            }
            | CosmosCommandVariant::QueryItems {
                database,
                container,
                ..
            } => vec!["dbs", database.as_str(), "colls", container.as_str(), "docs"],
            CosmosCommandVariant::ReadItem {
                database,
                container,
                id,
                ..
            }
            | CosmosCommandVariant::ReplaceItem {
                database,
                container,
                id,
                ..
            }
            | CosmosCommandVariant::DeleteItem {
                database,
                container,
                id,
                ..
            } => vec![
                "dbs",
                database.as_str(),
                "colls",
                container.as_str(),
                "docs",
                id.as_str(),
            ],
        }
    }

    /// The link the request is signed with. For creates and queries this is the parent.
    pub fn resource_link(&self) -> String {
        match self {
            CosmosCommandVariant::CreateDatabase { .. } => String::new(),
            CosmosCommandVariant::CreateContainer { database, .. } => format!("dbs/{}", database),
            CosmosCommandVariant::CreateItem {
                database,
                container,
                ..
            }
            | CosmosCommandVariant::QueryItems {
                database,
                container,
                ..
            } => format!("dbs/{}/colls/{}", database, container),
            _ => self.path_segments().join("/"),
        }
    }

    pub fn partition_key(&self) -> Option<&str> {
        match self {
            CosmosCommandVariant::ReadItem { partition_key, .. }
            | CosmosCommandVariant::CreateItem { partition_key, .. }
            | CosmosCommandVariant::ReplaceItem { partition_key, .. }
            | CosmosCommandVariant::DeleteItem { partition_key, .. } => Some(partition_key),
            _ => None,
        }
    }

    /// Human readable name of the addressed resource, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            CosmosCommandVariant::CreateDatabase { database } => format!("dbs/{}", database),
            CosmosCommandVariant::CreateContainer {
                database,
                container,
                ..
            } => format!("dbs/{}/colls/{}", database, container),
            CosmosCommandVariant::CreateItem {
                database,
                container,
                body,
                ..
            } => format!(
                "dbs/{}/colls/{}/docs/{}",
                database,
                container,
                body.get("id").and_then(Value::as_str).unwrap_or("<new>")
            ),
            _ => self.resource_link(),
        }
    }
}

impl CosmosCommand {
    pub fn url(&self) -> anyhow::Result<Url> {
        let mut url = self.base_server_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                anyhow::anyhow!("Endpoint `{}` cannot be a base url", self.base_server_url)
            })?
            .pop_if_empty()
            .extend(self.command.path_segments());
        Ok(url)
    }

    /// Returns a signed [`reqwest::Request`] for the specific [`CosmosCommandVariant`].
    pub fn get_http_request(
        &self,
        client: &reqwest::Client,
        key: &MasterKey,
        date: DateTime<Utc>,
    ) -> anyhow::Result<reqwest::Request> {
        let method = self.command.method();
        let ms_date = format_ms_date(date);
        let authorization = master_key_authorization(
            &method,
            self.command.resource_type(),
            &self.command.resource_link(),
            &ms_date,
            key,
        )?;

        let mut builder = client
            .request(method, self.url()?)
            .header("authorization", authorization)
            .header("x-ms-date", ms_date)
            .header("x-ms-version", API_VERSION)
            .header(ACCEPT, "application/json");

        if let Some(partition_key) = self.command.partition_key() {
            builder = builder.header(HEADER_PARTITION_KEY, serde_json::to_string(&[partition_key])?);
        }

        // Handle specific command bodies
        let builder = match &self.command {
            CosmosCommandVariant::CreateDatabase { database } => {
                builder.json(&json!({ "id": database }))
            }
            CosmosCommandVariant::CreateContainer {
                container,
                partition_key_path,
                ..
            } => builder.json(&json!({
                "id": container,
                "partitionKey": { "paths": [partition_key_path], "kind": "Hash" }
            })),
            CosmosCommandVariant::CreateItem { body, .. }
            | CosmosCommandVariant::ReplaceItem { body, .. } => builder.json(body),
            CosmosCommandVariant::QueryItems {
                query,
                continuation,
                ..
            } => {
                let mut builder = builder
                    .header(CONTENT_TYPE, "application/query+json")
                    .header("x-ms-documentdb-isquery", "True")
                    .header("x-ms-documentdb-query-enablecrosspartition", "True");
                if let Some(token) = continuation {
                    builder = builder.header(HEADER_CONTINUATION, token.as_str());
                }
                builder.body(serde_json::to_vec(query)?)
            }
            CosmosCommandVariant::ReadItem { .. } | CosmosCommandVariant::DeleteItem { .. } => {
                builder
            }
        };

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    const KEY: &str = "AAAAAAAAAAAAAAAAAAAAAA==";

    fn command(variant: CosmosCommandVariant) -> CosmosCommand {
        CosmosCommand {
            base_server_url: Url::parse("https://localhost:8081/").unwrap(),
            command: variant,
        }
    }

    fn read_item(id: &str) -> CosmosCommandVariant {
        CosmosCommandVariant::ReadItem {
            database: "Db".to_string(),
            container: "Application".to_string(),
            id: id.to_string(),
            partition_key: "app1".to_string(),
        }
    }

    #[test]
    fn url_addresses_item_by_id() {
        let url = command(read_item("app1.1")).url().unwrap();

        assert_eq!(
            url.as_str(),
            "https://localhost:8081/dbs/Db/colls/Application/docs/app1.1"
        );
    }

    #[test]
    fn url_percent_encodes_ids_but_resource_link_does_not() {
        // Arrange
        let cmd = command(read_item("a b/c"));

        // Act
        let url = cmd.url().unwrap();

        // Assert
        assert_eq!(
            url.as_str(),
            "https://localhost:8081/dbs/Db/colls/Application/docs/a%20b%2Fc"
        );
        assert_eq!(
            cmd.command.resource_link(),
            "dbs/Db/colls/Application/docs/a b/c"
        );
    }

    #[test]
    fn resource_links_for_creates_point_at_parent() {
        let create_db = CosmosCommandVariant::CreateDatabase {
            database: "Db".to_string(),
        };
        let create_coll = CosmosCommandVariant::CreateContainer {
            database: "Db".to_string(),
            container: "ApiRequest".to_string(),
            partition_key_path: "/partitionKey".to_string(),
        };
        let create_item = CosmosCommandVariant::CreateItem {
            database: "Db".to_string(),
            container: "ApiRequest".to_string(),
            partition_key: "pk".to_string(),
            body: json!({ "id": "r1" }),
        };

        assert_eq!(create_db.resource_link(), "");
        assert_eq!(create_db.resource_type(), "dbs");
        assert_eq!(create_coll.resource_link(), "dbs/Db");
        assert_eq!(create_coll.resource_type(), "colls");
        assert_eq!(create_item.resource_link(), "dbs/Db/colls/ApiRequest");
        assert_eq!(create_item.describe(), "dbs/Db/colls/ApiRequest/docs/r1");
    }

    #[test]
    fn get_http_request_sets_service_headers_and_partition_key() {
        // Arrange
        let key = MasterKey::parse(KEY).unwrap();
        let client = reqwest::Client::new();

        // Act
        let request = command(read_item("app1.1"))
            .get_http_request(&client, &key, Utc::now())
            .unwrap();

        // Assert
        let headers = request.headers();
        assert_eq!(request.method(), Method::GET);
        assert!(headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("type%3Dmaster"));
        assert!(headers.get("x-ms-date").is_some());
        assert_eq!(headers.get("x-ms-version").unwrap(), API_VERSION);
        assert_eq!(headers.get(HEADER_PARTITION_KEY).unwrap(), "[\"app1\"]");
    }

    #[test]
    fn get_http_request_for_query_sends_query_json_and_continuation() {
        // Arrange
        let key = MasterKey::parse(KEY).unwrap();
        let client = reqwest::Client::new();
        let cmd = command(CosmosCommandVariant::QueryItems {
            database: "Db".to_string(),
            container: "Application".to_string(),
            query: QuerySpec::field_equals("userId", "user1"),
            continuation: Some("token-1".to_string()),
        });

        // Act
        let request = cmd.get_http_request(&client, &key, Utc::now()).unwrap();

        // Assert
        let headers = request.headers();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "application/query+json"
        );
        assert_eq!(headers.get("x-ms-documentdb-isquery").unwrap(), "True");
        assert_eq!(headers.get(HEADER_CONTINUATION).unwrap(), "token-1");
        assert!(headers.get(HEADER_PARTITION_KEY).is_none());

        let body: Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "SELECT * FROM c WHERE c.userId = @userId",
                "parameters": [{ "name": "@userId", "value": "user1" }]
            })
        );
    }
}
