use super::Provider;
use crate::{Result, SecretSubError};
use secretsub_core::SecretSet;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

/// Configuration for the environment variables provider.
///
/// The provider reads directly from the process environment and takes no
/// options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvConfig {}

impl TryFrom<&Url> for EnvConfig {
    type Error = SecretSubError;

    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "env" {
            return Err(SecretSubError::ProviderOperationFailed(format!(
                "Invalid scheme '{}' for env provider",
                url.scheme()
            )));
        }

        Ok(Self::default())
    }
}

/// Uses the variables of the current process as secrets.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
pub struct EnvProvider {
    #[allow(dead_code)]
    config: EnvConfig,
}

crate::register_provider! {
    struct: EnvProvider,
    config: EnvConfig,
    name: "env",
    description: "Environment variables of the current process",
    schemes: ["env"],
    examples: ["env://"],
}

impl Provider for EnvProvider {
    fn name(&self) -> &'static str {
        Self::PROVIDER_NAME
    }

    fn fetch(&self, _credential: Option<&str>) -> Result<SecretSet> {
        Ok(env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect())
    }
}
