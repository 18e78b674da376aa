//! Error types for secretsub operations

use secretsub_core::SubstituteError;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for secretsub operations
///
/// Fetch errors (`Authentication`, `Network`) abort a run, while `FileIo`
/// errors are scoped to the one file they name.
#[derive(Error, Debug)]
pub enum SecretSubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to access {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("{0}")]
    Substitute(#[from] SubstituteError),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider backend '{0}' not found")]
    ProviderNotFound(String),
    #[error("Provider operation failed: {0}")]
    ProviderOperationFailed(String),
}

/// A type alias for `Result<T, SecretSubError>`
pub type Result<T> = std::result::Result<T, SecretSubError>;

impl From<reqwest::Error> for SecretSubError {
    fn from(err: reqwest::Error) -> Self {
        SecretSubError::Network(err.to_string())
    }
}

impl SecretSubError {
    /// Wraps an IO error with the path of the file it concerns.
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SecretSubError::FileIo {
            path: path.into(),
            source,
        }
    }
}
