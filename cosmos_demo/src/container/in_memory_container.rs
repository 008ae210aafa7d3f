use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::instrument;

use crate::{cosmos_command::QuerySpec, models::PARTITION_KEY_PATH, CosmosError};

use super::DocumentContainer;

/// A container held in process memory, for development and testing.
///
/// Items are keyed by partition key and id, like the service. Queries support the
/// `SELECT * FROM c [WHERE c.<field> = @<param> [AND ...]]` form only.
#[derive(Debug)]
pub struct InMemoryContainer {
    name: String,
    partition_key_path: String,
    items: DashMap<(String, String), Value>,
}

impl InMemoryContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key_path: PARTITION_KEY_PATH.to_string(),
            items: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn resource(&self, id: &str) -> String {
        format!("colls/{}/docs/{}", self.name, id)
    }

    /// Checks the item carries an id and that its partition key property matches.
    fn validate(&self, partition_key: &str, item: &Value) -> Result<String, CosmosError> {
        let id = item
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| bad_request("The input content is invalid because the required property `id` is missing"))?;

        let property = self.partition_key_path.trim_start_matches('/');
        match item.get(property).and_then(Value::as_str) {
            Some(value) if value == partition_key => Ok(id.to_string()),
            _ => Err(bad_request(
                "PartitionKey extracted from document doesn't match the one specified in the header",
            )),
        }
    }
}

#[async_trait]
impl DocumentContainer for InMemoryContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_if_not_exists(&self) -> Result<(), CosmosError> {
        tracing::debug!("In-memory container `{}` ready", self.name);
        Ok(())
    }

    #[instrument(level = "trace", skip(self), fields(container = %self.name))]
    async fn read_item(&self, id: &str, partition_key: &str) -> Result<Option<Value>, CosmosError> {
        Ok(self
            .items
            .get(&(partition_key.to_string(), id.to_string()))
            .map(|item| item.value().clone()))
    }

    #[instrument(level = "trace", skip(self, item), fields(container = %self.name))]
    async fn create_item(&self, partition_key: &str, item: Value) -> Result<Value, CosmosError> {
        let id = self.validate(partition_key, &item)?;
        match self.items.entry((partition_key.to_string(), id.clone())) {
            Entry::Occupied(_) => Err(CosmosError::Conflict(self.resource(&id))),
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
                Ok(item)
            }
        }
    }

    #[instrument(level = "trace", skip(self, item), fields(container = %self.name))]
    async fn replace_item(
        &self,
        id: &str,
        partition_key: &str,
        item: Value,
    ) -> Result<Value, CosmosError> {
        let item_id = self.validate(partition_key, &item)?;
        if item_id != id {
            return Err(bad_request("The id in the document does not match the id in the request"));
        }
        match self.items.get_mut(&(partition_key.to_string(), id.to_string())) {
            Some(mut existing) => {
                *existing = item.clone();
                Ok(item)
            }
            None => Err(CosmosError::NotFound(self.resource(id))),
        }
    }

    #[instrument(level = "trace", skip(self), fields(container = %self.name))]
    async fn delete_item(&self, id: &str, partition_key: &str) -> Result<(), CosmosError> {
        self.items
            .remove(&(partition_key.to_string(), id.to_string()))
            .map(|_| ())
            .ok_or_else(|| CosmosError::NotFound(self.resource(id)))
    }

    #[instrument(level = "trace", skip(self), fields(container = %self.name))]
    async fn query_items(&self, query: &QuerySpec) -> Result<Vec<Value>, CosmosError> {
        let filters = parse_filters(query)?;

        let mut results = self
            .items
            .iter()
            .filter(|entry| {
                filters
                    .iter()
                    .all(|(field, value)| entry.value().get(field.as_str()) == Some(*value))
            })
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect::<Vec<_>>();
        results.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(results.into_iter().map(|(_, item)| item).collect())
    }
}

fn bad_request(message: &str) -> CosmosError {
    CosmosError::Service {
        status: StatusCode::BAD_REQUEST,
        message: message.to_string(),
    }
}

/// Turns `SELECT * FROM c WHERE c.a = @a AND c.b = @b` into `[("a", value), ("b", value)]`.
fn parse_filters(query: &QuerySpec) -> Result<Vec<(String, &Value)>, CosmosError> {
    let unsupported = || bad_request(&format!("Unsupported query: {}", query.query));

    let text = query.query.trim();
    let rest = strip_prefix_ignore_case(text, "SELECT * FROM c").ok_or_else(unsupported)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    let rest = strip_prefix_ignore_case(rest, "WHERE ").ok_or_else(unsupported)?;

    let mut filters = Vec::new();
    for clause in split_ignore_case(rest, " AND ") {
        let (field, param) = clause.split_once('=').ok_or_else(unsupported)?;
        let field = field.trim().strip_prefix("c.").ok_or_else(unsupported)?;
        let param = param.trim();
        let value = query
            .parameters
            .iter()
            .find(|p| p.name == param)
            .map(|p| &p.value)
            .ok_or_else(|| bad_request(&format!("Query parameter `{}` was not supplied", param)))?;
        filters.push((field.to_string(), value));
    }
    Ok(filters)
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn split_ignore_case<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let lower = text.to_ascii_lowercase();
    let separator = separator.to_ascii_lowercase();
    let mut parts = Vec::new();
    let mut start = 0;
    while let Some(offset) = lower[start..].find(&separator) {
        parts.push(&text[start..start + offset]);
        start += offset + separator.len();
    }
    parts.push(&text[start..]);
    parts
}
