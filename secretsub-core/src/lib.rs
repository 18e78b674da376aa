//! # secretsub core
//!
//! Placeholder matching and substitution for secretsub.
//!
//! This crate knows nothing about where secrets come from or where text is
//! stored. It takes a [`Dialect`], a text and a [`SecretSet`], and returns the
//! rewritten text together with a [`SubstitutionReport`] describing which
//! placeholders were resolved.
//!
//! ```
//! use secretsub_core::{Dialect, SecretSet, process};
//!
//! let secrets: SecretSet = [("HOST", "db.local"), ("PORT", "5432")].into_iter().collect();
//! let out = process("host: ${HOST}, port: ${PORT}", Dialect::DollarCurly, &secrets).unwrap();
//!
//! assert_eq!(out.text, "host: db.local, port: 5432");
//! assert_eq!(out.report.substituted, 2);
//! ```

mod dialect;
mod engine;
mod error;
mod secrets;

pub use dialect::{Dialect, Placeholder, PlaceholderPattern, ScopedReplacer};
pub use engine::{Engine, Match, Outcome, Substitution, SubstitutionReport, process};
pub use error::{Result, SubstituteError};
pub use secrets::{SecretSet, SecretValue};
