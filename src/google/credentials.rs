//! Service account key used for domain-wide delegation.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service account JSON key this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("{0} not found. Add Google service account key in project root.")]
    Missing(String),
    #[error("Invalid service account key {path}: {reason}")]
    Invalid { path: String, reason: String },
}

pub trait CredentialProvider: Send + Sync {
    fn load(&self) -> Result<ServiceAccountKey, CredentialError>;
}

/// Reads the key file on every call so a key dropped in after startup is
/// picked up.
#[derive(Debug, Clone)]
pub struct FileCredentialProvider {
    path: PathBuf,
}

impl FileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialProvider for FileCredentialProvider {
    fn load(&self) -> Result<ServiceAccountKey, CredentialError> {
        let path = self.path.display().to_string();
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(CredentialError::Missing(path));
            }
            Err(err) => {
                return Err(CredentialError::Invalid {
                    path,
                    reason: err.to_string(),
                });
            }
        };

        serde_json::from_str(&contents).map_err(|err| CredentialError::Invalid {
            path,
            reason: err.to_string(),
        })
    }
}
