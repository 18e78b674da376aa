use super::Provider;
use crate::{Result, SecretSubError};
use http::StatusCode;
use http::header::ACCEPT;
use secretsub_core::{SecretSet, SecretValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Path of the Doppler endpoint that downloads every secret of a config.
const DOWNLOAD_PATH: &str = "/v3/configs/config/secrets/download";

const DEFAULT_API_HOST: &str = "api.doppler.com";

/// Configuration for the Doppler provider.
///
/// Parsed from URLs in the following formats:
/// - `doppler://` - the public Doppler API
/// - `doppler://api.example.com` - a different API host
/// - `doppler://?project=backend&config=prd` - select a project and config,
///   needed when the token is not a service token scoped to one config
/// - `doppler://127.0.0.1:8080?scheme=http` - plain HTTP, for local servers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DopplerConfig {
    /// Host (and optional port) of the Doppler API.
    pub api_host: String,
    /// `https`, or `http` for local test servers.
    pub scheme: String,
    /// Optional Doppler project name.
    pub project: Option<String>,
    /// Optional Doppler config name (e.g. `dev`, `prd`).
    pub config: Option<String>,
}

impl Default for DopplerConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            scheme: "https".to_string(),
            project: None,
            config: None,
        }
    }
}

impl TryFrom<&Url> for DopplerConfig {
    type Error = SecretSubError;

    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "doppler" {
            return Err(SecretSubError::ProviderOperationFailed(format!(
                "Invalid scheme '{}' for doppler provider",
                url.scheme()
            )));
        }

        let mut config = Self::default();

        if let Some(host) = url.host_str().filter(|h| !h.is_empty()) {
            config.api_host = match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
        }

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "scheme" => match value.as_ref() {
                    "http" | "https" => config.scheme = value.to_string(),
                    other => {
                        return Err(SecretSubError::ProviderOperationFailed(format!(
                            "Unsupported scheme '{}' for doppler provider, use http or https",
                            other
                        )));
                    }
                },
                "project" => config.project = Some(value.to_string()),
                "config" => config.config = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(config)
    }
}

impl DopplerConfig {
    /// The full download URL, including the query string.
    pub fn endpoint(&self) -> Result<Url> {
        let base = format!("{}://{}{}", self.scheme, self.api_host, DOWNLOAD_PATH);
        let mut url = Url::parse(&base).map_err(|e| {
            SecretSubError::ProviderOperationFailed(format!(
                "Invalid Doppler endpoint '{}': {}",
                base, e
            ))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("format", "json");
            if let Some(project) = &self.project {
                query.append_pair("project", project);
            }
            if let Some(config) = &self.config {
                query.append_pair("config", config);
            }
        }
        Ok(url)
    }
}

/// Fetches secrets from the Doppler API.
///
/// The token is sent as the username of HTTP basic authentication with an
/// empty password, which is how Doppler accepts service tokens.
pub struct DopplerProvider {
    config: DopplerConfig,
}

crate::register_provider! {
    struct: DopplerProvider,
    config: DopplerConfig,
    name: "doppler",
    description: "Doppler secrets manager (Recommended)",
    schemes: ["doppler"],
    examples: ["doppler://", "doppler://?project=backend&config=dev"],
}

impl DopplerProvider {
    fn client(&self) -> Result<reqwest::blocking::Client> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("secretsub/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30));
        // Plain HTTP is only accepted for local servers, which must not be
        // routed through a proxy picked up from the environment.
        if self.config.scheme == "http" {
            builder = builder.no_proxy();
        }
        Ok(builder.build()?)
    }
}

impl Provider for DopplerProvider {
    fn name(&self) -> &'static str {
        Self::PROVIDER_NAME
    }

    fn fetch(&self, credential: Option<&str>) -> Result<SecretSet> {
        let token = credential.filter(|t| !t.is_empty()).ok_or_else(|| {
            SecretSubError::Authentication(
                "No Doppler token provided. Set DOPPLER_TOKEN or pass --token".to_string(),
            )
        })?;

        let endpoint = self.config.endpoint()?;
        debug!(%endpoint, "fetching secrets from doppler");

        let response = self
            .client()?
            .get(endpoint)
            .basic_auth(token, Some(""))
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SecretSubError::Authentication(format!(
                "Doppler rejected the token ({})",
                status
            )));
        }
        let body = response.text()?;
        if !status.is_success() {
            return Err(SecretSubError::Network(format!(
                "Doppler returned {}: {}",
                status,
                body.trim()
            )));
        }

        let secrets = parse_secrets(&body)?;
        debug!(count = secrets.len(), "fetched secrets from doppler");
        Ok(secrets)
    }
}

/// Parses the JSON object returned by the download endpoint.
///
/// String values become text secrets; any other JSON value is kept as
/// [`SecretValue::Unsupported`] so that substituting it fails explicitly.
pub fn parse_secrets(body: &str) -> Result<SecretSet> {
    let object: serde_json::Map<String, Value> = serde_json::from_str(body)?;
    Ok(object
        .into_iter()
        .map(|(name, value)| (name, secret_value(value)))
        .collect())
}

fn secret_value(value: Value) -> SecretValue {
    match value {
        Value::String(text) => SecretValue::Text(text),
        Value::Null => SecretValue::Unsupported { kind: "null" },
        Value::Bool(_) => SecretValue::Unsupported { kind: "boolean" },
        Value::Number(_) => SecretValue::Unsupported { kind: "number" },
        Value::Array(_) => SecretValue::Unsupported { kind: "array" },
        Value::Object(_) => SecretValue::Unsupported { kind: "object" },
    }
}
