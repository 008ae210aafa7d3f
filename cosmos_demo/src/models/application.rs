use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An application owned by a user, stored in the `Application` collection.
///
/// The document id is always `{app_id}.1` and the partition key is the app id, so a
/// single application can be addressed with a point read knowing only its app id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub partition_key: String,
    pub user_id: String,
    pub app_id: String,
    pub app_name: String,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

impl Application {
    pub fn new(
        user_id: impl Into<String>,
        app_id: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Self {
        let app_id = app_id.into();
        Self {
            id: Self::document_id(&app_id),
            partition_key: app_id.clone(),
            user_id: user_id.into(),
            app_id,
            app_name: app_name.into(),
            api_keys: Vec::new(),
        }
    }

    /// The document id for the application with the given app id.
    pub fn document_id(app_id: &str) -> String {
        format!("{}.1", app_id)
    }

    pub fn api_key(&self, value: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.value == value)
    }

    pub(crate) fn api_key_mut(&mut self, value: &str) -> Option<&mut ApiKey> {
        self.api_keys.iter_mut().find(|k| k.value == value)
    }
}

impl std::fmt::Display for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Application `{}` ({})", self.app_name, self.id)?;
        writeln!(f, "  UserId: {}", self.user_id)?;
        writeln!(f, "  AppId:  {}", self.app_id)?;
        if self.api_keys.is_empty() {
            write!(f, "  ApiKeys: none")
        } else {
            write!(f, "  ApiKeys:")?;
            for key in &self.api_keys {
                write!(f, "\n    {}", key)?;
            }
            Ok(())
        }
    }
}

/// An API key embedded in its owning [`Application`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ApiKey {
    /// A new key with a freshly generated value and no scopes.
    pub fn generate(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            value: generate_key_value(),
            scopes: Vec::new(),
            created: now,
            updated: now,
        }
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (created {}, updated {})",
            self.name,
            self.value,
            self.created.to_rfc3339(),
            self.updated.to_rfc3339()
        )?;
        if !self.scopes.is_empty() {
            write!(f, " scopes [{}]", self.scopes.join(", "))?;
        }
        Ok(())
    }
}

pub fn generate_key_value() -> String {
    Uuid::new_v4().to_string()
}
