use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A recorded API request. Apart from its identity the record is opaque and is
/// persisted exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    pub id: String,
    pub partition_key: String,
    #[serde(flatten)]
    properties: Map<String, Value>,
}

/// Property names that carry the record's identity and cannot be set as extra properties.
const IDENTITY_PROPERTIES: [&str; 2] = ["id", "partitionKey"];

impl ApiRequest {
    pub fn new(id: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            partition_key: partition_key.into(),
            properties: Map::new(),
        }
    }

    /// Adds an extra property. Identity properties are ignored, so the stored document
    /// keeps the id and partition key it was created with.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        if IDENTITY_PROPERTIES.contains(&name.as_str()) {
            tracing::warn!("Ignoring extra property `{}` on api request `{}`", name, self.id);
            return self;
        }
        self.properties.insert(name, value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}
