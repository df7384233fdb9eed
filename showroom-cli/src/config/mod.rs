//! Configuration file and environment overrides
//!
//! Settings live in `<config dir>/showroom-discount/config.toml`. Every key is
//! optional; a missing file means defaults. Environment variables (also read
//! from `.env`) override the file:
//!
//! - `SHOWROOM_TABLE`: destination as `project.dataset.table`
//! - `SHOWROOM_LOCATION`: dataset location
//! - `SHOWROOM_SECRETS_PATH`: TOML secrets file with a `[service_account]` table
//! - `SHOWROOM_KEY_FILE`: service-account JSON key

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::store::bigquery::{DEFAULT_API_BASE, DEFAULT_UPLOAD_BASE};
use crate::store::{
    BigQuerySettings, ChainProvider, DEFAULT_TABLE, KeyFileProvider, SecretsFileProvider, TableRef,
};

const APP_DIR: &str = "showroom-discount";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub target: TargetConfig,
    pub credentials: CredentialsConfig,
    pub store: StoreConfig,
}

/// Where uploads go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub table: String,
    pub location: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            location: None,
        }
    }
}

/// Credential sources, tried in this order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub secrets_path: PathBuf,
    pub key_file: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            secrets_path: PathBuf::from(".streamlit/secrets.toml"),
            key_file: PathBuf::from("service_account.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub api_base: String,
    pub upload_base: String,
    pub token_uri: Option<String>,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
            token_uri: None,
            poll_interval_ms: 1000,
            request_timeout_secs: 300,
        }
    }
}

impl Config {
    /// `<config dir>/showroom-discount/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from an explicit path (must exist) or the default location
    /// (optional), then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `SHOWROOM_*` overrides; `lookup` is `std::env::var` outside tests
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(table) = lookup("SHOWROOM_TABLE") {
            self.target.table = table;
        }
        if let Some(location) = lookup("SHOWROOM_LOCATION") {
            self.target.location = Some(location);
        }
        if let Some(path) = lookup("SHOWROOM_SECRETS_PATH") {
            self.credentials.secrets_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SHOWROOM_KEY_FILE") {
            self.credentials.key_file = PathBuf::from(path);
        }
    }

    pub fn table_ref(&self) -> Result<TableRef> {
        self.target.table.parse()
    }

    /// Secrets file first, then the JSON key file
    pub fn credential_chain(&self) -> ChainProvider {
        ChainProvider::new()
            .with(SecretsFileProvider::new(&self.credentials.secrets_path))
            .with(KeyFileProvider::new(&self.credentials.key_file))
    }

    pub fn bigquery_settings(&self) -> BigQuerySettings {
        BigQuerySettings {
            api_base: self.store.api_base.trim_end_matches('/').to_string(),
            upload_base: self.store.upload_base.trim_end_matches('/').to_string(),
            token_uri: self.store.token_uri.clone(),
            location: self.target.location.clone(),
            poll_interval: Duration::from_millis(self.store.poll_interval_ms.max(100)),
            request_timeout: Duration::from_secs(self.store.request_timeout_secs.max(1)),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
