//! The name → value mapping substituted into placeholders

use crate::{Result, SubstituteError};
use std::collections::BTreeMap;

/// A single value fetched from a secret source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    /// A value that can be written into a text file as-is
    Text(String),
    /// A value the source returned in a form that has no text representation,
    /// e.g. a JSON number or object. `kind` names that form.
    Unsupported { kind: &'static str },
}

impl SecretValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SecretValue::Text(value) => Some(value),
            SecretValue::Unsupported { .. } => None,
        }
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        SecretValue::Text(value)
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        SecretValue::Text(value.to_string())
    }
}

/// The secrets available for one run.
///
/// Built once from a provider and only read afterwards, so a single set can
/// be shared by every file processed during the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretSet {
    values: BTreeMap<String, SecretValue>,
}

impl SecretSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SecretValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&SecretValue> {
        self.values.get(name)
    }

    /// Looks up the text value of `name`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` if the secret exists and is text
    /// - `Ok(None)` if the secret doesn't exist
    /// - `Err(SubstituteError::UnsupportedValueType)` if the secret exists but is not text
    pub fn text(&self, name: &str) -> Result<Option<&str>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(SecretValue::Text(value)) => Ok(Some(value)),
            Some(SecretValue::Unsupported { kind }) => Err(SubstituteError::UnsupportedValueType {
                name: name.to_string(),
                kind: *kind,
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Secret names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for SecretSet
where
    K: Into<String>,
    V: Into<SecretValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = SecretSet::new();
        set.extend(iter);
        set
    }
}

impl<K, V> Extend<(K, V)> for SecretSet
where
    K: Into<String>,
    V: Into<SecretValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}
