//! Item-level access to a single container.
//!
//! [`DocumentContainer`] is the seam repositories are written against. It is the
//! whole contract the repositories need from a document store: provisioning,
//! point reads and writes by id + partition key, and parameterised queries.

mod cosmos_container;
mod in_memory_container;

pub use cosmos_container::*;
pub use in_memory_container::*;

use async_trait::async_trait;
use serde_json::Value;

use crate::{cosmos_command::QuerySpec, CosmosError};

/// Properties the service adds to every stored document.
pub const SYSTEM_PROPERTIES: [&str; 5] = ["_rid", "_self", "_etag", "_attachments", "_ts"];

#[async_trait]
pub trait DocumentContainer: Send + Sync + std::fmt::Debug {
    /// The container's name, which is also the collection name.
    fn name(&self) -> &str;

    /// Ensures the database and the container exist. Safe to call on every startup.
    async fn create_if_not_exists(&self) -> Result<(), CosmosError>;

    /// Point read. `Ok(None)` when no item has that id in that partition.
    async fn read_item(&self, id: &str, partition_key: &str) -> Result<Option<Value>, CosmosError>;

    /// Creates an item, failing with [`CosmosError::Conflict`] if the id is taken.
    async fn create_item(&self, partition_key: &str, item: Value) -> Result<Value, CosmosError>;

    /// Replaces an existing item, failing with [`CosmosError::NotFound`] if there is none.
    async fn replace_item(
        &self,
        id: &str,
        partition_key: &str,
        item: Value,
    ) -> Result<Value, CosmosError>;

    async fn delete_item(&self, id: &str, partition_key: &str) -> Result<(), CosmosError>;

    /// Runs a query across all partitions and returns every matching item.
    async fn query_items(&self, query: &QuerySpec) -> Result<Vec<Value>, CosmosError>;
}

pub(crate) fn strip_system_properties(mut item: Value) -> Value {
    if let Some(map) = item.as_object_mut() {
        for property in SYSTEM_PROPERTIES {
            map.remove(property);
        }
    }
    item
}
