use super::Provider;
use crate::{Result, SecretSubError};
use secretsub_core::SecretSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration for the dotenv provider.
///
/// # Examples
///
/// ```ignore
/// let url = Url::parse("dotenv:///srv/app/.env")?;
/// let config = DotEnvConfig::try_from(&url)?;
/// assert_eq!(config.path, PathBuf::from("/srv/app/.env"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DotEnvConfig {
    /// Path to the .env file.
    pub path: PathBuf,
}

impl Default for DotEnvConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".env"),
        }
    }
}

impl TryFrom<&Url> for DotEnvConfig {
    type Error = SecretSubError;

    /// Relative paths arrive split across host and path (`dotenv://config/.env`),
    /// absolute paths arrive with an empty host (`dotenv:///srv/.env`).
    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "dotenv" {
            return Err(SecretSubError::ProviderOperationFailed(format!(
                "Invalid scheme '{}' for dotenv provider",
                url.scheme()
            )));
        }

        let path = format!("{}{}", url.host_str().unwrap_or(""), url.path());
        if path.is_empty() {
            Ok(Self::default())
        } else {
            Ok(Self {
                path: PathBuf::from(path),
            })
        }
    }
}

/// Reads secrets from a `.env` file.
pub struct DotEnvProvider {
    config: DotEnvConfig,
}

crate::register_provider! {
    struct: DotEnvProvider,
    config: DotEnvConfig,
    name: "dotenv",
    description: "Traditional .env files",
    schemes: ["dotenv"],
    examples: ["dotenv://.env", "dotenv:/path/to/.env"],
}

impl Provider for DotEnvProvider {
    fn name(&self) -> &'static str {
        Self::PROVIDER_NAME
    }

    /// The credential is ignored; a missing file is an error.
    fn fetch(&self, _credential: Option<&str>) -> Result<SecretSet> {
        let mut secrets = SecretSet::new();
        for item in dotenvy::from_path_iter(&self.config.path)? {
            let (key, value) = item?;
            secrets.insert(key, value);
        }
        Ok(secrets)
    }
}
