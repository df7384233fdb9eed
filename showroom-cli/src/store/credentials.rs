//! Credential sources for write access to the table store
//!
//! Sources are tried in order by [`ChainProvider`]. A source that simply has
//! nothing to offer reports [`CredentialError::Missing`] and the chain moves
//! on; a source with unusable content stops the chain.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::error::CredentialError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Table name expected in the secrets file
pub const SECRETS_TABLE: &str = "service_account";

/// Google service-account key, as found in `service_account.json`
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Something that can hand out write-capable credentials
pub trait CredentialProvider: Send + Sync {
    /// Human-readable name used in error messages
    fn describe(&self) -> String;

    fn load(&self) -> Result<ServiceAccountKey, CredentialError>;
}

/// `[service_account]` table of a TOML secrets file
#[derive(Debug, Clone)]
pub struct SecretsFileProvider {
    path: PathBuf,
}

impl SecretsFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Deserialize)]
struct SecretsFile {
    service_account: Option<ServiceAccountKey>,
}

impl CredentialProvider for SecretsFileProvider {
    fn describe(&self) -> String {
        format!("{} [{}]", self.path.display(), SECRETS_TABLE)
    }

    fn load(&self) -> Result<ServiceAccountKey, CredentialError> {
        let content = read_source(&self.path, self.describe())?;
        let secrets: SecretsFile =
            toml::from_str(&content).map_err(|e| CredentialError::Invalid {
                source_name: self.describe(),
                reason: e.to_string().trim().to_string(),
            })?;

        secrets
            .service_account
            .ok_or_else(|| CredentialError::Missing(self.describe()))
    }
}

/// Service-account JSON key file
#[derive(Debug, Clone)]
pub struct KeyFileProvider {
    path: PathBuf,
}

impl KeyFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for KeyFileProvider {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<ServiceAccountKey, CredentialError> {
        let content = read_source(&self.path, self.describe())?;
        serde_json::from_str(&content).map_err(|e| CredentialError::Invalid {
            source_name: self.describe(),
            reason: e.to_string(),
        })
    }
}

/// Tries each provider in order until one yields credentials
#[derive(Default)]
pub struct ChainProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl CredentialProvider for ChainProvider {
    fn describe(&self) -> String {
        self.providers
            .iter()
            .map(|p| p.describe())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn load(&self) -> Result<ServiceAccountKey, CredentialError> {
        let mut tried = Vec::new();

        for provider in &self.providers {
            match provider.load() {
                Ok(key) => {
                    info!(
                        "Using credentials for {} from {}",
                        key.client_email,
                        provider.describe()
                    );
                    return Ok(key);
                }
                Err(CredentialError::Missing(source)) => {
                    debug!("No credentials in {}", source);
                    tried.push(source);
                }
                Err(CredentialError::NotFound { tried: nested }) => tried.extend(nested),
                Err(err) => return Err(err),
            }
        }

        Err(CredentialError::NotFound { tried })
    }
}

fn read_source(path: &Path, name: String) -> Result<String, CredentialError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == IoErrorKind::NotFound => Err(CredentialError::Missing(name)),
        Err(e) => Err(CredentialError::Invalid {
            source_name: name,
            reason: e.to_string(),
        }),
    }
}
