//! Credential provider contract and the file-backed store

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::errors::DeploysError;
use crate::filesys::file::File;
use crate::models::deploy::Platform;

/// A secret the monitor needs from the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    RenderApiKey,
    VercelApiKey,
    VercelTeamId,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 3] = [
        CredentialKey::RenderApiKey,
        CredentialKey::VercelApiKey,
        CredentialKey::VercelTeamId,
    ];

    /// Name of the entry in the credential store
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::RenderApiKey => "render_api_key",
            CredentialKey::VercelApiKey => "vercel_api_key",
            CredentialKey::VercelTeamId => "vercel_team_id",
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            CredentialKey::RenderApiKey => Platform::Render,
            CredentialKey::VercelApiKey | CredentialKey::VercelTeamId => Platform::Vercel,
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        CredentialKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| format!("Unknown credential: {}", s))
    }
}

/// Source of platform secrets.
///
/// Implementations must reflect the most recently stored value on every call and
/// must fail closed: a value that cannot be decoded is an error, never garbage.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Get a secret, `None` when it has not been stored
    async fn get_credential(
        &self,
        key: CredentialKey,
    ) -> Result<Option<SecretString>, DeploysError>;
}

/// Get a secret or fail with `CredentialUnavailable`
pub async fn require_credential(
    provider: &dyn CredentialProvider,
    key: CredentialKey,
) -> Result<SecretString, DeploysError> {
    match provider.get_credential(key).await {
        Ok(Some(secret)) => Ok(secret),
        Ok(None) => Err(DeploysError::CredentialUnavailable(format!(
            "{} {} is not set",
            key.platform(),
            key
        ))),
        Err(e) => Err(DeploysError::CredentialUnavailable(format!(
            "{} {} could not be read: {}",
            key.platform(),
            key,
            e
        ))),
    }
}

/// Credential store backed by a JSON file of base64-encoded values
pub struct FileCredentialProvider {
    file: File,
}

impl FileCredentialProvider {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, DeploysError> {
        Ok(self.file.read_json_opt().await?.unwrap_or_default())
    }

    /// Store or replace a secret
    pub async fn store_credential(
        &self,
        key: CredentialKey,
        value: &SecretString,
    ) -> Result<(), DeploysError> {
        if value.expose_secret().trim().is_empty() {
            return Err(DeploysError::StorageError(format!(
                "Refusing to store an empty {}",
                key
            )));
        }

        let mut entries = self.read_entries().await?;
        entries.insert(
            key.as_str().to_string(),
            STANDARD.encode(value.expose_secret().as_bytes()),
        );
        self.file.write_json(&entries).await?;

        info!("Stored credential {}", key);
        Ok(())
    }

    /// Remove a secret, returning whether it was present
    pub async fn remove_credential(&self, key: CredentialKey) -> Result<bool, DeploysError> {
        let mut entries = self.read_entries().await?;
        let removed = entries.remove(key.as_str()).is_some();
        if removed {
            self.file.write_json(&entries).await?;
            info!("Removed credential {}", key);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn get_credential(
        &self,
        key: CredentialKey,
    ) -> Result<Option<SecretString>, DeploysError> {
        let entries = self.read_entries().await?;
        let Some(encoded) = entries.get(key.as_str()) else {
            debug!(
                "Credential {} not found in {}",
                key,
                self.file.path().display()
            );
            return Ok(None);
        };

        let bytes = STANDARD.decode(encoded.trim())?;
        let value = String::from_utf8(bytes).map_err(|_| {
            DeploysError::CredentialUnavailable(format!("{} is not valid UTF-8", key))
        })?;

        if value.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(value)))
    }
}
