// src/infra/credentials.rs — API credential storage
//
// The credential is always user-supplied — environment variable first,
// then ~/.townhall/credentials.json — and is validated locally before
// any network call. It is never embedded in the binary.
//
// # Security Note
// The key is stored as plaintext JSON with chmod 600 on Unix. For higher
// security environments, prefer the environment variable.

use serde::{Deserialize, Serialize};

use crate::infra::errors::TownhallError;
use crate::infra::paths;

/// OpenAI keys carry this fixed prefix; anything else is rejected before
/// it reaches the wire.
pub const KEY_PREFIX: &str = "sk-";

const ENV_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
}

impl Credentials {
    /// Load from disk, letting the environment variable override.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::credentials_file();

        let mut creds = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var(ENV_VAR) {
            if !key.trim().is_empty() {
                creds.openai_api_key = Some(key.trim().to_string());
            }
        }

        Ok(creds)
    }

    /// Persist to disk with owner-only permissions.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = paths::credentials_file();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// The validated key, or the error a host should surface before
    /// allowing submission.
    pub fn api_key(&self) -> Result<&str, TownhallError> {
        let key = self
            .openai_api_key
            .as_deref()
            .ok_or(TownhallError::MissingCredential)?;
        validate_key(key)?;
        Ok(key)
    }
}

/// Format check applied before any network call.
pub fn validate_key(key: &str) -> Result<(), TownhallError> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(TownhallError::MissingCredential);
    }
    if !trimmed.starts_with(KEY_PREFIX) {
        return Err(TownhallError::InvalidCredential(format!(
            "API keys start with \"{}\"",
            KEY_PREFIX
        )));
    }
    Ok(())
}
