//! secretsub - inject secrets into text files
//!
//! secretsub fetches a set of secrets from a provider (Doppler by default)
//! and substitutes them into every file of a directory, replacing placeholders
//! written in one of several variable expression dialects:
//!
//! - `dollar`: `$MYVAR`
//! - `dollar-curly`: `${MYVAR}` (default)
//! - `handlebars`: `{{MYVAR}}`
//! - `dollar-handlebars`: `${{MYVAR}}`
//!
//! Files in which at least one placeholder resolved are written to the output
//! directory under the same relative path; the others are reported and left
//! alone. The matching and substitution engine lives in the
//! [`secretsub_core`] crate and is re-exported here.
//!
//! # Example
//!
//! ```ignore
//! use secretsub::files::OutputDir;
//! use secretsub::provider::Provider;
//! use secretsub::{Dialect, Engine, Injector};
//!
//! let provider = Box::<dyn Provider>::try_from("doppler")?;
//! let secrets = provider.fetch(std::env::var("DOPPLER_TOKEN").ok().as_deref())?;
//!
//! let injector = Injector::new(Engine::new(Dialect::DollarCurly)?, &secrets)
//!     .write_to(OutputDir::create("./export")?);
//! let summary = injector.run("./files".as_ref())?;
//! println!("{} files written", summary.written);
//! ```

mod config;
mod error;
mod inject;

pub mod files;
pub mod provider;

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;

pub use config::{DEFAULT_PROVIDER, GlobalConfig, GlobalDefaults, Settings};
pub use error::{Result, SecretSubError};
pub use inject::{FileOutcome, Injector, RunSummary};

pub use secretsub_core::{
    Dialect, Engine, Match, Outcome, SecretSet, SecretValue, SubstituteError, Substitution,
    SubstitutionReport,
};
