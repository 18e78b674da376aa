//! # Variable expression dialects
//!
//! A dialect is one delimiter convention for placeholders. Every dialect shares
//! the same name grammar, `[A-Z][A-Z0-9_]*`, and differs only in the text that
//! opens and closes the name:
//!
//! | Dialect             | Example     |
//! |---------------------|-------------|
//! | `dollar`            | `$NAME`     |
//! | `dollar-curly`      | `${NAME}`   |
//! | `handlebars`        | `{{NAME}}`  |
//! | `dollar-handlebars` | `${{NAME}}` |
//!
//! [`PlaceholderPattern`] extracts every placeholder of a dialect from a text,
//! while [`ScopedReplacer`] matches the placeholders of a single name so that
//! replacing `FOO` never touches `FOOBAR`.

use crate::{Result, SubstituteError};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Grammar of a placeholder name.
const NAME: &str = "[A-Z][A-Z0-9_]*";

/// Characters that may continue a name once it has started.
const NAME_TAIL: &str = "[A-Z0-9_]*";

/// The placeholder syntax to look for in input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// `$NAME`, terminated by the first character that cannot continue a name
    Dollar,
    /// `${NAME}`
    #[default]
    DollarCurly,
    /// `{{NAME}}`
    Handlebars,
    /// `${{NAME}}`
    DollarHandlebars,
}

impl Dialect {
    /// Every supported dialect, in the order they are listed to users.
    pub const ALL: [Dialect; 4] = [
        Dialect::Dollar,
        Dialect::DollarCurly,
        Dialect::Handlebars,
        Dialect::DollarHandlebars,
    ];

    /// The tag used to select this dialect on the command line and in config files.
    pub fn tag(self) -> &'static str {
        match self {
            Dialect::Dollar => "dollar",
            Dialect::DollarCurly => "dollar-curly",
            Dialect::Handlebars => "handlebars",
            Dialect::DollarHandlebars => "dollar-handlebars",
        }
    }

    /// Opening and closing delimiters around a name.
    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Dialect::Dollar => ("$", ""),
            Dialect::DollarCurly => ("${", "}"),
            Dialect::Handlebars => ("{{", "}}"),
            Dialect::DollarHandlebars => ("${{", "}}"),
        }
    }

    /// Renders the placeholder for `name` in this dialect.
    ///
    /// ```
    /// use secretsub_core::Dialect;
    ///
    /// assert_eq!(Dialect::DollarHandlebars.placeholder("TOKEN"), "${{TOKEN}}");
    /// ```
    pub fn placeholder(self, name: &str) -> String {
        let (open, close) = self.delimiters();
        format!("{open}{name}{close}")
    }

    /// Selects a dialect from its tag.
    ///
    /// In strict mode an unknown tag is rejected with
    /// [`SubstituteError::InvalidDialect`]. In lenient mode an unknown tag falls
    /// back to [`Dialect::DollarCurly`], which is what older releases of the
    /// tool did silently; the fallback is logged.
    pub fn resolve(tag: &str, strict: bool) -> Result<Self> {
        match tag.parse() {
            Ok(dialect) => Ok(dialect),
            Err(err) if strict => Err(err),
            Err(_) => {
                let fallback = Dialect::default();
                tracing::warn!(
                    tag,
                    fallback = fallback.tag(),
                    "unknown variable expression, falling back to the default"
                );
                Ok(fallback)
            }
        }
    }

    /// Builds the regex source for this dialect with `body` as the captured name.
    fn pattern_source(self, body: &str) -> String {
        let (open, close) = self.delimiters();
        format!("{}({}){}", regex::escape(open), body, regex::escape(close))
    }

    /// Whether a match starting at `start` belongs to this dialect.
    ///
    /// `{{NAME}}` directly after a `$` is a `dollar-handlebars` placeholder and
    /// is left alone by the `handlebars` dialect.
    fn claims(self, text: &str, start: usize) -> bool {
        match self {
            Dialect::Handlebars => !text[..start].ends_with('$'),
            Dialect::Dollar | Dialect::DollarCurly | Dialect::DollarHandlebars => true,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Dialect {
    type Err = SubstituteError;

    fn from_str(s: &str) -> Result<Self> {
        Dialect::ALL
            .into_iter()
            .find(|dialect| dialect.tag() == s)
            .ok_or_else(|| SubstituteError::InvalidDialect(s.to_string()))
    }
}

/// One placeholder occurrence found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'t> {
    /// The bare name, without delimiters
    pub name: &'t str,
    /// Byte range of the whole placeholder, delimiters included
    pub span: Range<usize>,
}

/// Extracts the placeholders of one dialect from arbitrary text.
#[derive(Debug, Clone)]
pub struct PlaceholderPattern {
    dialect: Dialect,
    regex: Regex,
}

impl PlaceholderPattern {
    pub fn compile(dialect: Dialect) -> Result<Self> {
        let regex = Regex::new(&dialect.pattern_source(NAME))?;
        Ok(Self { dialect, regex })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Iterates over placeholder occurrences from first to last.
    pub fn find_iter<'t>(&self, text: &'t str) -> impl Iterator<Item = Placeholder<'t>> {
        self.regex.captures_iter(text).filter_map(move |caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            self.dialect
                .claims(text, whole.start())
                .then(|| Placeholder {
                    name: name.as_str(),
                    span: whole.range(),
                })
        })
    }

    /// The names of all placeholder occurrences, duplicates included.
    pub fn names<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.find_iter(text).map(|p| p.name).collect()
    }
}

/// Matches the placeholders of exactly one name in one dialect.
#[derive(Debug, Clone)]
pub struct ScopedReplacer {
    dialect: Dialect,
    name: String,
    regex: Regex,
}

impl ScopedReplacer {
    pub fn compile(dialect: Dialect, name: &str) -> Result<Self> {
        let literal = regex::escape(name);
        // `$NAME` has no closing delimiter, so the rest of the name has to be
        // consumed before the match can be compared with `name`.
        let body = match dialect {
            Dialect::Dollar => format!("{}{}", literal, NAME_TAIL),
            Dialect::DollarCurly | Dialect::Handlebars | Dialect::DollarHandlebars => literal,
        };
        let regex = Regex::new(&dialect.pattern_source(&body))?;
        Ok(Self {
            dialect,
            name: name.to_string(),
            regex,
        })
    }

    /// Byte ranges of every placeholder of this name, in order.
    pub fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                (name.as_str() == self.name && self.dialect.claims(text, whole.start()))
                    .then(|| whole.range())
            })
            .collect()
    }

    /// Replaces every placeholder of this name with `value`.
    ///
    /// Returns the rewritten text and the number of placeholders replaced.
    /// `value` is inserted literally.
    pub fn replace_all(&self, text: &str, value: &str) -> (String, usize) {
        let spans = self.find_spans(text);
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for span in &spans {
            out.push_str(&text[cursor..span.start]);
            out.push_str(value);
            cursor = span.end;
        }
        out.push_str(&text[cursor..]);
        (out, spans.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(dialect: Dialect, text: &str) -> Vec<String> {
        PlaceholderPattern::compile(dialect)
            .unwrap()
            .names(text)
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_tags_round_trip_through_from_str() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.tag().parse::<Dialect>().unwrap(), dialect);
            assert_eq!(dialect.to_string(), dialect.tag());
        }
    }

    #[test]
    fn test_unknown_tag_is_rejected_in_strict_mode() {
        let err = Dialect::resolve("mustache", true).unwrap_err();
        assert_eq!(err, SubstituteError::InvalidDialect("mustache".to_string()));
        assert!(err.to_string().contains("dollar-curly"));
    }

    #[test]
    fn test_unknown_tag_falls_back_in_lenient_mode() {
        assert_eq!(
            Dialect::resolve("mustache", false).unwrap(),
            Dialect::DollarCurly
        );
        assert_eq!(
            Dialect::resolve("handlebars", false).unwrap(),
            Dialect::Handlebars
        );
    }

    #[test]
    fn test_default_is_dollar_curly() {
        assert_eq!(Dialect::default(), Dialect::DollarCurly);
    }

    #[test]
    fn test_serde_uses_kebab_case_tags() {
        let dialect: Dialect = serde_json::from_str("\"dollar-handlebars\"").unwrap();
        assert_eq!(dialect, Dialect::DollarHandlebars);
        assert!(serde_json::from_str::<Dialect>("\"mustache\"").is_err());
    }

    #[test]
    fn test_extracts_names_for_each_dialect() {
        assert_eq!(names(Dialect::Dollar, "a $HOST b $PORT_2"), ["HOST", "PORT_2"]);
        assert_eq!(names(Dialect::DollarCurly, "${HOST}:${PORT}"), ["HOST", "PORT"]);
        assert_eq!(names(Dialect::Handlebars, "{{HOST}}:{{PORT}}"), ["HOST", "PORT"]);
        assert_eq!(
            names(Dialect::DollarHandlebars, "${{HOST}}:${{PORT}}"),
            ["HOST", "PORT"]
        );
    }

    #[test]
    fn test_single_letter_names_are_placeholders() {
        assert_eq!(names(Dialect::DollarCurly, "${A}"), ["A"]);
        assert_eq!(names(Dialect::Dollar, "$A."), ["A"]);
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        assert_eq!(
            names(Dialect::DollarCurly, "${B} ${A} ${B}"),
            ["B", "A", "B"]
        );
    }

    #[test]
    fn test_invalid_bodies_are_not_placeholders() {
        assert!(names(Dialect::DollarCurly, "${lower} ${FOO BAR} ${1ABC} ${}").is_empty());
        assert!(names(Dialect::Handlebars, "{{ NAME }} {{name}}").is_empty());
    }

    #[test]
    fn test_does_not_match_across_closing_delimiter() {
        assert_eq!(
            names(Dialect::DollarCurly, "${FOO} and } ${BAR}"),
            ["FOO", "BAR"]
        );
    }

    #[test]
    fn test_dollar_names_are_greedy() {
        assert_eq!(names(Dialect::Dollar, "$FOOBAR $FOO"), ["FOOBAR", "FOO"]);
    }

    #[test]
    fn test_dialects_are_isolated() {
        assert!(names(Dialect::Dollar, "{{NAME}} ${NAME} ${{NAME}}").is_empty());
        assert!(names(Dialect::DollarCurly, "$NAME {{NAME}} ${{NAME}}").is_empty());
        assert!(names(Dialect::DollarHandlebars, "$NAME {{NAME}} ${NAME}").is_empty());
        assert!(names(Dialect::Handlebars, "$NAME ${NAME} ${{NAME}}").is_empty());
    }

    #[test]
    fn test_placeholder_spans_cover_delimiters() {
        let pattern = PlaceholderPattern::compile(Dialect::DollarHandlebars).unwrap();
        let found: Vec<_> = pattern.find_iter("x ${{KEY}}").collect();
        assert_eq!(
            found,
            [Placeholder {
                name: "KEY",
                span: 2..10
            }]
        );
    }

    #[test]
    fn test_scoped_replacer_ignores_longer_names() {
        for dialect in Dialect::ALL {
            let text = format!(
                "{} {} {}",
                dialect.placeholder("FOO"),
                dialect.placeholder("FOOBAR"),
                dialect.placeholder("FOO_2")
            );
            let replacer = ScopedReplacer::compile(dialect, "FOO").unwrap();
            let (out, count) = replacer.replace_all(&text, "x");
            assert_eq!(count, 1, "dialect {dialect}");
            assert_eq!(
                out,
                format!(
                    "x {} {}",
                    dialect.placeholder("FOOBAR"),
                    dialect.placeholder("FOO_2")
                )
            );
        }
    }

    #[test]
    fn test_scoped_replacer_replaces_every_occurrence() {
        let replacer = ScopedReplacer::compile(Dialect::Dollar, "HOME").unwrap();
        let (out, count) = replacer.replace_all("$HOME/bin:$HOME/.local", "/root");
        assert_eq!(out, "/root/bin:/root/.local");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_scoped_replacer_inserts_value_literally() {
        let replacer = ScopedReplacer::compile(Dialect::DollarCurly, "PASS").unwrap();
        let (out, _) = replacer.replace_all("pw=${PASS}", "a$1${0}\\");
        assert_eq!(out, "pw=a$1${0}\\");
    }

    #[test]
    fn test_handlebars_skips_dollar_handlebars_tokens() {
        let replacer = ScopedReplacer::compile(Dialect::Handlebars, "KEY").unwrap();
        let (out, count) = replacer.replace_all("${{KEY}} {{KEY}}", "v");
        assert_eq!(out, "${{KEY}} v");
        assert_eq!(count, 1);
    }
}
