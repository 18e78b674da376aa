//! User configuration
//!
//! An optional `config.toml` in the platform config directory supplies
//! defaults for options that are not given on the command line:
//!
//! ```toml
//! [defaults]
//! provider = "doppler://?project=backend&config=dev"
//! dialect = "handlebars"
//! lenient = false
//! ```

use crate::Result;
use secretsub_core::Dialect;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

/// Provider used when neither the command line nor the config names one.
pub const DEFAULT_PROVIDER: &str = "doppler";

/// Global user configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub defaults: GlobalDefaults,
}

/// Default settings in the global configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GlobalDefaults {
    /// Provider URI to fetch secrets from
    pub provider: Option<String>,
    /// Variable expression used when none is given on the command line
    pub dialect: Option<Dialect>,
    /// Fall back to `dollar-curly` on unknown variable expressions
    #[serde(default)]
    pub lenient: bool,
}

impl GlobalConfig {
    /// Gets the path to the global configuration file,
    /// typically `~/.config/secretsub/config.toml` on Linux.
    pub fn path() -> std::result::Result<PathBuf, io::Error> {
        use directories::ProjectDirs;
        let dirs = ProjectDirs::from("", "", "secretsub").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Loads the global configuration, or `None` if there is no config file.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&content)?))
    }
}

/// Options for one run after command line and config file are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider: String,
    pub dialect: Dialect,
    pub lenient: bool,
}

impl Settings {
    /// Merges command line values over config values over built-in defaults.
    ///
    /// `dialect` is the raw tag from the command line; an unknown tag is
    /// rejected unless lenient mode is on.
    pub fn resolve(
        config: Option<&GlobalConfig>,
        provider: Option<String>,
        dialect: Option<&str>,
        lenient: bool,
    ) -> Result<Self> {
        let defaults = config.map(|c| c.defaults.clone()).unwrap_or_default();
        let lenient = lenient || defaults.lenient;
        let dialect = match dialect {
            Some(tag) => Dialect::resolve(tag, !lenient)?,
            None => defaults.dialect.unwrap_or_default(),
        };
        let provider = provider
            .or(defaults.provider)
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        Ok(Self {
            provider,
            dialect,
            lenient,
        })
    }
}
