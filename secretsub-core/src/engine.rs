//! # Substitution engine
//!
//! [`Engine::process`] rewrites the placeholders of a text whose names are
//! present in a [`SecretSet`] and reports what it found:
//!
//! 1. every placeholder occurrence is extracted in order, duplicates included;
//! 2. each occurrence's name is looked up, and the first time a name resolves
//!    all of its placeholders are located with a [`ScopedReplacer`];
//! 3. the located placeholders are replaced in a single pass over the
//!    original text.
//!
//! Because replacement positions are taken from the original text, a secret
//! value that itself looks like a placeholder is inserted verbatim, and the
//! order in which names are handled has no influence on the output.

use crate::dialect::{Dialect, PlaceholderPattern, ScopedReplacer};
use crate::secrets::SecretSet;
use crate::{Result, SubstituteError};
use std::collections::HashSet;
use std::ops::Range;
use tracing::debug;


/// What happened to one placeholder occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The name had a text value and its placeholders were replaced
    Resolved,
    /// No secret with this name exists; the placeholder is left untouched
    Missing,
    /// The secret exists but could not be substituted
    Failed(SubstituteError),
}

/// A placeholder occurrence and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub name: String,
    pub outcome: Outcome,
}

impl Match {
    pub fn is_resolved(&self) -> bool {
        self.outcome == Outcome::Resolved
    }
}

/// Per-text summary of a substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// One entry per placeholder occurrence, in the order they appear
    pub matches: Vec<Match>,
    /// Number of distinct names substituted at least once
    pub substituted: usize,
    /// Number of placeholders rewritten
    pub replacements: usize,
}

impl SubstitutionReport {
    /// Whether the rewritten text is worth persisting.
    pub fn should_write(&self) -> bool {
        self.substituted > 0
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// `(name, resolved)` for every occurrence, in order.
    pub fn pairs(&self) -> Vec<(&str, bool)> {
        self.matches
            .iter()
            .map(|m| (m.name.as_str(), m.is_resolved()))
            .collect()
    }

    /// Names of occurrences that had no secret.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .filter(|m| m.outcome == Outcome::Missing)
            .map(|m| m.name.as_str())
    }

    /// Occurrences whose secret could not be substituted, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SubstituteError)> {
        self.matches.iter().filter_map(|m| match &m.outcome {
            Outcome::Failed(err) => Some((m.name.as_str(), err)),
            Outcome::Resolved | Outcome::Missing => None,
        })
    }
}

/// The rewritten text together with its report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub report: SubstitutionReport,
}

/// Substitutes secrets into texts written in one dialect.
///
/// The extraction pattern is compiled once and the engine holds no mutable
/// state, so one engine can serve every file of a run, from any thread.
///
/// # Example
///
/// ```
/// use secretsub_core::{Dialect, Engine, SecretSet};
///
/// let secrets: SecretSet = [("HOST", "db.local")].into_iter().collect();
/// let engine = Engine::new(Dialect::DollarCurly).unwrap();
///
/// let out = engine.process("host: ${HOST}, port: ${PORT}", &secrets).unwrap();
/// assert_eq!(out.text, "host: db.local, port: ${PORT}");
/// assert_eq!(out.report.pairs(), [("HOST", true), ("PORT", false)]);
/// assert_eq!(out.report.substituted, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    pattern: PlaceholderPattern,
}

impl Engine {
    pub fn new(dialect: Dialect) -> Result<Self> {
        Ok(Self {
            pattern: PlaceholderPattern::compile(dialect)?,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.pattern.dialect()
    }

    /// Replaces every placeholder whose name has a text value in `secrets`.
    ///
    /// Placeholders without a secret are left byte-for-byte intact. A secret
    /// that is not text fails only its own name; the rest of the text is
    /// still substituted.
    pub fn process(&self, text: &str, secrets: &SecretSet) -> Result<Substitution> {
        let dialect = self.dialect();
        let mut report = SubstitutionReport::default();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut edits: Vec<(Range<usize>, &str)> = Vec::new();

        for placeholder in self.pattern.find_iter(text) {
            let name = placeholder.name;
            let outcome = match secrets.text(name) {
                Ok(Some(value)) => {
                    if seen.insert(name) {
                        let spans = ScopedReplacer::compile(dialect, name)?.find_spans(text);
                        report.substituted += 1;
                        report.replacements += spans.len();
                        edits.extend(spans.into_iter().map(|span| (span, value)));
                    }
                    Outcome::Resolved
                }
                Ok(None) => Outcome::Missing,
                Err(err) => Outcome::Failed(err),
            };
            debug!(name, ?outcome, "placeholder");
            report.matches.push(Match {
                name: name.to_string(),
                outcome,
            });
        }

        edits.sort_by_key(|(span, _)| span.start);
        Ok(Substitution {
            text: splice(text, &edits),
            report,
        })
    }
}

/// Convenience wrapper building a one-off [`Engine`].
pub fn process(text: &str, dialect: Dialect, secrets: &SecretSet) -> Result<Substitution> {
    Engine::new(dialect)?.process(text, secrets)
}

/// Applies sorted, non-overlapping replacements to `text`.
fn splice(text: &str, edits: &[(Range<usize>, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (span, value) in edits {
        if span.start < cursor {
            continue;
        }
        out.push_str(&text[cursor..span.start]);
        out.push_str(value);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}
