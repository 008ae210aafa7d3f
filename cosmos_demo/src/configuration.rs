//! Settings for connecting to the Cosmos DB account.
//!
//! Values come from an optional TOML file and then from the environment, with the
//! environment taking precedence. Both the endpoint and the primary key are
//! required; loading fails before any connection is attempted if either is missing.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use crate::error_chain_fmt;

pub const ENDPOINT_URI_VAR: &str = "COSMOS_ENDPOINT_URI";
pub const PRIMARY_KEY_VAR: &str = "COSMOS_PRIMARY_KEY";
pub const DATABASE_VAR: &str = "COSMOS_DATABASE";
pub const CONFIG_PATH_VAR: &str = "COSMOS_CONFIG";

pub const DEFAULT_CONFIG_FILE: &str = "configuration.toml";
pub const DEFAULT_DATABASE_NAME: &str = "CosmosGettingStarted";

/// Connection settings, constructed once at startup and passed by reference.
#[derive(Clone, Debug)]
pub struct Settings {
    pub endpoint_uri: Url,
    pub primary_key: MasterKey,
    pub database_name: String,
}

/// The account key used to sign requests. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey(String);

impl MasterKey {
    /// Wraps a base64 account key, rejecting anything that does not decode.
    pub fn parse(key: &str) -> Result<Self, ConfigurationError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigurationError::Missing(PRIMARY_KEY_VAR));
        }
        STANDARD
            .decode(key)
            .map_err(|_| ConfigurationError::InvalidPrimaryKey)?;
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Vec<u8> {
        // Validated in `parse`.
        STANDARD.decode(&self.0).unwrap_or_default()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    endpoint_uri: Option<String>,
    primary_key: Option<String>,
    database_name: Option<String>,
}

impl Settings {
    /// Loads settings from `configuration.toml` (or the file named by `COSMOS_CONFIG`)
    /// and the process environment.
    #[instrument(level = "debug", name = "Load Settings")]
    pub fn load() -> Result<Self, ConfigurationError> {
        let explicit = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        let (path, required) = match explicit {
            Some(path) => (path, true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let file = read_settings_file(&path, required)?;
        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    /// Builds settings from already-read file contents and an environment lookup.
    pub fn from_sources<F>(file: Option<String>, env: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match file {
            Some(contents) => toml::from_str::<SettingsFile>(&contents)?,
            None => SettingsFile::default(),
        };

        let lookup = |var: &str, from_file: Option<String>| {
            env(var)
                .filter(|v| !v.trim().is_empty())
                .or(from_file)
                .filter(|v| !v.trim().is_empty())
        };

        let endpoint = lookup(ENDPOINT_URI_VAR, file.endpoint_uri)
            .ok_or(ConfigurationError::Missing(ENDPOINT_URI_VAR))?;
        let endpoint_uri = Url::parse(endpoint.trim())
            .map_err(|e| ConfigurationError::InvalidEndpoint(endpoint.clone(), e))?;
        if !matches!(endpoint_uri.scheme(), "http" | "https") {
            return Err(ConfigurationError::UnsupportedScheme(
                endpoint_uri.scheme().to_string(),
            ));
        }

        let key = lookup(PRIMARY_KEY_VAR, file.primary_key)
            .ok_or(ConfigurationError::Missing(PRIMARY_KEY_VAR))?;
        let primary_key = MasterKey::parse(&key)?;

        let database_name = lookup(DATABASE_VAR, file.database_name)
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());

        tracing::debug!(endpoint = %endpoint_uri, database = %database_name, "Settings loaded");

        Ok(Self {
            endpoint_uri,
            primary_key,
            database_name,
        })
    }
}

fn read_settings_file(path: &Path, required: bool) -> Result<Option<String>, ConfigurationError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            tracing::trace!("No settings file at {}", path.display());
            Ok(None)
        }
        Err(e) => Err(ConfigurationError::File(path.to_path_buf(), e)),
    }
}

#[derive(thiserror::Error)]
pub enum ConfigurationError {
    #[error("Required setting `{0}` is not set")]
    Missing(&'static str),
    #[error("Endpoint `{0}` is not a valid URI")]
    InvalidEndpoint(String, #[source] url::ParseError),
    #[error("Endpoint scheme `{0}` is not supported, use http or https")]
    UnsupportedScheme(String),
    #[error("Primary key is not valid base64")]
    InvalidPrimaryKey,
    #[error("Unable to read settings file `{0}`")]
    File(PathBuf, #[source] std::io::Error),
    #[error("Settings file is not valid TOML")]
    Parse(#[from] toml::de::Error),
}
impl std::fmt::Debug for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
