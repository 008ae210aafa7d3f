use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::{
    configuration::Settings,
    container::DocumentContainer,
    cosmos_command::QuerySpec,
    models::{generate_key_value, ApiKey, Application},
    DocumentStore,
};

use super::{RepositoryBase, RepositoryError};

/// Applications and the API keys embedded in them.
///
/// Key mutations read the whole application, change its key list and replace the
/// document. Two concurrent mutations of the same application are last-writer-wins.
#[derive(Clone, Debug)]
pub struct ApplicationRepository {
    base: RepositoryBase,
}

impl ApplicationRepository {
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

    #[instrument(level = "info", name = "Get Applications By User", skip(self))]
    pub async fn get_all_applications_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Application>, RepositoryError> {
        self.base
            .query(&QuerySpec::field_equals("userId", user_id))
            .await
    }

    /// `Ok(None)` when there is no application with this app id.
    #[instrument(level = "info", name = "Get Application", skip(self))]
    pub async fn get_application(&self, app_id: &str) -> Result<Option<Application>, RepositoryError> {
        self.base
            .read(&Application::document_id(app_id), app_id)
            .await
    }

    #[instrument(level = "info", name = "Create Application", skip(self, application), fields(app_id = %application.app_id))]
    pub async fn create_application(
        &self,
        mut application: Application,
    ) -> Result<Application, RepositoryError> {
        // Identity always follows the app id, whatever the caller put in these fields.
        application.id = Application::document_id(&application.app_id);
        application.partition_key = application.app_id.clone();

        let created = self
            .base
            .create(&application.partition_key, &application)
            .await?;
        tracing::info!("Application created");
        Ok(created)
    }

    #[instrument(level = "info", name = "Create Api Key", skip(self, api_key), fields(name = %api_key.name))]
    pub async fn create_api_key(
        &self,
        app_id: &str,
        api_key: ApiKey,
    ) -> Result<Application, RepositoryError> {
        let mut application = self.load(app_id).await?;

        if application.api_key(&api_key.value).is_some() {
            return Err(RepositoryError::DuplicateApiKey {
                app_id: app_id.to_string(),
                value: api_key.value,
            });
        }

        application.api_keys.push(api_key);
        self.save(&application).await
    }

    #[instrument(level = "info", name = "Regenerate Api Key", skip(self, value))]
    pub async fn regenerate_api_key(
        &self,
        app_id: &str,
        value: &str,
    ) -> Result<Application, RepositoryError> {
        let mut application = self.load(app_id).await?;

        let mut new_value = generate_key_value();
        while application.api_key(&new_value).is_some() {
            new_value = generate_key_value();
        }

        let key = application
            .api_key_mut(value)
            .ok_or_else(|| key_not_found(app_id, value))?;
        key.value = new_value;
        key.updated = Utc::now();

        self.save(&application).await
    }

    #[instrument(level = "info", name = "Update Api Key Label", skip(self, value))]
    pub async fn update_api_key_label(
        &self,
        app_id: &str,
        value: &str,
        label: &str,
    ) -> Result<Application, RepositoryError> {
        let mut application = self.load(app_id).await?;

        let key = application
            .api_key_mut(value)
            .ok_or_else(|| key_not_found(app_id, value))?;
        key.name = label.to_string();
        key.updated = Utc::now();

        self.save(&application).await
    }

    /// Removes the key from the application.
    #[instrument(level = "info", name = "Retire Api Key", skip(self, value))]
    pub async fn retire_api_key(&self, app_id: &str, value: &str) -> Result<(), RepositoryError> {
        let mut application = self.load(app_id).await?;

        let position = application
            .api_keys
            .iter()
            .position(|k| k.value == value)
            .ok_or_else(|| key_not_found(app_id, value))?;
        let retired = application.api_keys.remove(position);

        self.save(&application).await?;
        tracing::info!("Api key `{}` retired", retired.name);
        Ok(())
    }

    async fn load(&self, app_id: &str) -> Result<Application, RepositoryError> {
        self.get_application(app_id)
            .await?
            .ok_or_else(|| RepositoryError::ApplicationNotFound(app_id.to_string()))
    }

    async fn save(&self, application: &Application) -> Result<Application, RepositoryError> {
        self.base
            .replace(&application.id, &application.partition_key, application)
            .await
    }
}

fn key_not_found(app_id: &str, value: &str) -> RepositoryError {
    RepositoryError::ApiKeyNotFound {
        app_id: app_id.to_string(),
        value: value.to_string(),
    }
}
