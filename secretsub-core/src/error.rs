//! Error types for placeholder matching and substitution

use thiserror::Error;

/// Errors raised while selecting a dialect or substituting a secret.
///
/// Missing secrets are not errors; they are reported as
/// [`Outcome::Missing`](crate::Outcome::Missing) in the substitution report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubstituteError {
    #[error(
        "Unsupported variable expression '{0}'. Expected one of: dollar, dollar-curly, handlebars, dollar-handlebars"
    )]
    InvalidDialect(String),
    #[error("Secret '{name}' holds a {kind} value, which cannot be substituted as text")]
    UnsupportedValueType { name: String, kind: &'static str },
    #[error("Invalid placeholder pattern: {0}")]
    Pattern(String),
}

/// A type alias for `Result<T, SubstituteError>`
pub type Result<T> = std::result::Result<T, SubstituteError>;

impl From<regex::Error> for SubstituteError {
    fn from(err: regex::Error) -> Self {
        SubstituteError::Pattern(err.to_string())
    }
}
