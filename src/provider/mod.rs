//! # Provider System
//!
//! Providers are the sources secrets are fetched from before any file is
//! processed. Each provider turns its backend's data into a [`SecretSet`]
//! that the substitution engine reads for the rest of the run.
//!
//! ## Available Providers
//!
//! - [`DopplerProvider`](doppler::DopplerProvider): Doppler secrets download API (default)
//! - [`DotEnvProvider`](dotenv::DotEnvProvider): `.env` file support
//! - [`EnvProvider`](env::EnvProvider): process environment variables
//!
//! ## URI-Based Configuration
//!
//! ```text
//! doppler://
//! doppler://api.doppler.com?project=backend&config=prd
//! dotenv:/path/to/.env
//! env://
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use secretsub::provider::Provider;
//! use std::convert::TryFrom;
//!
//! let provider = Box::<dyn Provider>::try_from("doppler")?;
//! let secrets = provider.fetch(Some("dp.st.dev_xxxx"))?;
//! ```

use crate::{Result, SecretSubError};
use secretsub_core::SecretSet;
use std::convert::TryFrom;
use url::Url;

pub mod doppler;
pub mod dotenv;
pub mod env;
#[macro_use]
pub mod macros;

#[cfg(test)]
pub(crate) mod tests;

/// Information about a secret provider.
///
/// Used to list the available providers in the CLI help output.
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// The canonical name of the provider (e.g., "doppler").
    pub name: &'static str,
    /// A human-readable description of what the provider does.
    pub description: &'static str,
    /// Example URIs showing how to configure this provider.
    pub examples: &'static [&'static str],
}

impl ProviderInfo {
    /// Formats the provider information for display, including examples if available.
    ///
    /// - Without examples: "name: description"
    /// - With examples: "name: description (e.g., example1, example2)"
    pub fn display_with_examples(&self) -> String {
        if self.examples.is_empty() {
            format!("{}: {}", self.name, self.description)
        } else {
            format!(
                "{}: {} (e.g., {})",
                self.name,
                self.description,
                self.examples.join(", ")
            )
        }
    }
}

pub use macros::{PROVIDER_REGISTRY, ProviderRegistration, lookup};

/// Returns a list of all available providers with their metadata, sorted by name.
pub fn providers() -> Vec<ProviderInfo> {
    let mut infos: Vec<ProviderInfo> = PROVIDER_REGISTRY
        .iter()
        .map(|reg| reg.info.clone())
        .collect();
    infos.sort_by_key(|info| info.name);
    infos
}

/// Trait defining the interface for secret sources.
///
/// A provider is asked once per run for the complete set of secrets. Any
/// error it returns aborts the run, since no file can be processed without
/// secrets.
///
/// Providers must be `Send + Sync` so they can be held behind a
/// `Box<dyn Provider>` created from the registry.
pub trait Provider: Send + Sync {
    /// Fetches every secret the provider can see.
    ///
    /// # Arguments
    ///
    /// * `credential` - An access token for providers that need one
    ///
    /// # Errors
    ///
    /// - [`SecretSubError::Authentication`] if the credential is missing or rejected
    /// - [`SecretSubError::Network`] if the backend cannot be reached
    fn fetch(&self, credential: Option<&str>) -> Result<SecretSet>;

    /// Returns the name of this provider.
    ///
    /// This should match the name registered with the provider macro.
    fn name(&self) -> &'static str;
}

impl TryFrom<String> for Box<dyn Provider> {
    type Error = SecretSubError;

    fn try_from(s: String) -> Result<Self> {
        Self::try_from(&s as &str)
    }
}

impl TryFrom<&str> for Box<dyn Provider> {
    type Error = SecretSubError;

    /// Creates a provider instance from a URI string.
    ///
    /// Bare provider names (`doppler`) and path shorthands (`dotenv:/path/.env`)
    /// are normalized into URLs before they are handed to the provider.
    fn try_from(s: &str) -> Result<Self> {
        let (scheme, rest) = match s.find(':') {
            Some(pos) => (&s[..pos], &s[pos + 1..]),
            None => (s, ""),
        };

        if lookup(scheme).is_none() {
            return Err(SecretSubError::ProviderNotFound(scheme.to_string()));
        }

        let url_string = match rest {
            // Just scheme name (e.g., "doppler")
            "" | ":" => format!("{}://", scheme),
            // Standard URI format (e.g., "doppler://api.doppler.com")
            s if s.starts_with("//") => format!("{}:{}", scheme, s),
            // Path only format (e.g., "dotenv:/path/to/.env")
            s if s.starts_with('/') => format!("{}://{}", scheme, s),
            // Everything else, assume it's a host or path component
            s => format!("{}://{}", scheme, s),
        };

        let proper_url = Url::parse(&url_string).map_err(|e| {
            SecretSubError::ProviderOperationFailed(format!(
                "Invalid provider specification '{}': {}",
                s, e
            ))
        })?;

        Self::try_from(&proper_url)
    }
}

impl TryFrom<&Url> for Box<dyn Provider> {
    type Error = SecretSubError;

    fn try_from(url: &Url) -> Result<Self> {
        let scheme = url.scheme();

        let registration =
            lookup(scheme).ok_or_else(|| SecretSubError::ProviderNotFound(scheme.to_string()))?;

        (registration.build)(url)
    }
}
