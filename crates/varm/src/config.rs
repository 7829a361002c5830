//! Record-store configuration
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults (public Airtable endpoint, `Offers` table)
//! 2. Config file: `varm.toml` in the working directory
//! 3. Environment variables: `VARM_*`
//!
//! # Example Config
//!
//! ```toml
//! base_id = "appXXXXXXXXXXXXXX"
//! api_key = "keyXXXXXXXXXXXXXX"
//! table_name = "Offers"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default REST endpoint of the tabular record store
const DEFAULT_BASE_URL: &str = "https://api.airtable.com/v0";

/// Default table holding the offer records
const DEFAULT_TABLE_NAME: &str = "Offers";

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A required setting is missing
    #[error("missing configuration: {0}")]
    Missing(String),

    /// The config file could not be read or parsed
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Connection settings for the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// REST endpoint of the store
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base (database) identifier
    #[serde(default)]
    pub base_id: String,
    /// API key used as a bearer token
    #[serde(default)]
    pub api_key: String,
    /// Table holding offer records
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_table_name() -> String {
    DEFAULT_TABLE_NAME.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_id: String::new(),
            api_key: String::new(),
            table_name: default_table_name(),
        }
    }
}

impl StoreConfig {
    /// Load configuration: file (when present), then env overrides,
    /// then validate.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` when the file exists but cannot be parsed,
    /// `Missing` when a required setting is absent after all layers.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path.as_ref())?.unwrap_or_default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read the config file if it exists; `Ok(None)` when absent.
    fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Invalid(format!("cannot read {}: {e}", path.display())))?;
        let config = toml::from_str(&raw)
            .map_err(|e| ConfigError::Invalid(format!("cannot parse {}: {e}", path.display())))?;
        Ok(Some(config))
    }

    /// Apply `VARM_*` environment variables over the current values.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("VARM_BASE_URL") {
            self.base_url = value;
        }
        if let Ok(value) = std::env::var("VARM_BASE_ID") {
            self.base_id = value;
        }
        if let Ok(value) = std::env::var("VARM_API_KEY") {
            self.api_key = value;
        }
        if let Ok(value) = std::env::var("VARM_TABLE_NAME") {
            self.table_name = value;
        }
    }

    /// Check that every required setting is present.
    ///
    /// # Errors
    ///
    /// Returns `Missing` with a remediation hint naming the env var to set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_id.is_empty() {
            return Err(ConfigError::Missing(
                "base_id is not set. Set it in varm.toml or via VARM_BASE_ID".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::Missing(
                "api_key is not set. Set it in varm.toml or via VARM_API_KEY".to_string(),
            ));
        }
        Ok(())
    }

    /// URL of the offers table.
    #[must_use]
    pub fn table_url(&self) -> String {
        format!("{}/{}/{}", self.base_url, self.base_id, self.table_name)
    }

    /// URL of a single record within the offers table.
    #[must_use]
    pub fn record_url(&self, record_id: &str) -> String {
        format!("{}/{record_id}", self.table_url())
    }
}
