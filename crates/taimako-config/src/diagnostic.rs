// SPDX-FileCopyrightText: 2026 Taimako Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns Figment extraction failures into miette diagnostics.
//!
//! Unknown keys are checked against the section table in [`crate::model`] so a key written
//! under the wrong table (say `reuse_window_secs` under `[groq]`) points at
//! its real home. Values that came from `TAIMAKO_*` variables name the
//! variable instead of a file.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::fmt::Write as _;

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::env_var_name;
use crate::model::sections_with_key;

/// Source name used for configuration passed in as a string.
pub const INLINE_SOURCE: &str = "<inline>";

/// Jaro-Winkler score a candidate must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, renderable through miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key or section that `TaimakoConfig` does not define anywhere.
    #[error("unknown configuration key `{key}` in {table}")]
    #[diagnostic(
        code(taimako::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys, origin))
    )]
    UnknownKey {
        key: String,
        /// `[section]`, or `the top level`.
        table: String,
        suggestion: Option<String>,
        valid_keys: String,
        /// Where the key was set: a file, inline TOML, or an env var.
        origin: String,
        #[label("not a Taimako setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A real key written under a table that does not accept it.
    #[error("`{key}` is not a setting of {table}")]
    #[diagnostic(
        code(taimako::config::misplaced_key),
        help("move `{key}` under {belongs_in}")
    )]
    MisplacedKey {
        key: String,
        table: String,
        /// The owning table(s), e.g. `[triage]` or `[groq] or [ledger]`.
        belongs_in: String,
        #[label("belongs in {belongs_in}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into the field's type.
    #[error("invalid type for `{key}`: {detail}")]
    #[diagnostic(
        code(taimako::config::invalid_type),
        help("set {origin} to {expected}")
    )]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        origin: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A required key is absent.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(taimako::config::missing_key),
        help("add `{key}` to taimako.toml or set it through its TAIMAKO_ variable")
    )]
    MissingKey { key: String },

    /// A semantic check that failed after deserialization.
    #[error("validation error: {message}")]
    #[diagnostic(code(taimako::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(taimako::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str, origin: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? (set in {origin}) Valid keys: {valid_keys}"),
        None => format!("remove it from {origin}. Valid keys: {valid_keys}"),
    }
}

/// Where a failing value was read from.
#[derive(Debug, Clone, PartialEq)]
enum Origin {
    File(String),
    Inline,
    Env,
    Unknown,
}

impl Origin {
    fn of(error: &figment::Error) -> Self {
        let Some(meta) = &error.metadata else {
            return Origin::Unknown;
        };
        match &meta.source {
            Some(figment::Source::File(path)) => Origin::File(path.display().to_string()),
            _ if meta.name.contains("environment variable") => Origin::Env,
            Some(figment::Source::Code(_)) => Origin::Inline,
            _ => Origin::Unknown,
        }
    }

    fn describe(&self, path: &[String]) -> String {
        match self {
            Origin::File(file) => format!("`{file}`"),
            Origin::Inline => "the inline configuration".to_string(),
            Origin::Env => format!("`{}`", env_var_name(path)),
            Origin::Unknown => "the configuration".to_string(),
        }
    }

    fn text<'s>(&self, sources: &'s [(String, String)]) -> Option<(&'s str, &'s str)> {
        let wanted = match self {
            Origin::File(file) => file.as_str(),
            Origin::Inline => INLINE_SOURCE,
            Origin::Env | Origin::Unknown => return None,
        };
        sources
            .iter()
            .find(|(name, _)| name == wanted)
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }
}

/// What to underline in the TOML source.
enum Target<'a> {
    Key { section: Option<&'a str>, key: &'a str },
    Section(&'a str),
}

fn span_for(
    origin: &Origin,
    sources: &[(String, String)],
    target: Target<'_>,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some((name, content)) = origin.text(sources) else {
        return (None, None);
    };
    let found = match target {
        Target::Key { section, key } => locate_key(content, section, key).map(|at| (at, key.len())),
        Target::Section(section) => {
            locate_section(content, section).map(|at| (at, section.len()))
        }
    };
    match found {
        Some((at, len)) => (
            Some(SourceSpan::new(at.into(), len)),
            Some(NamedSource::new(name, content.to_string())),
        ),
        None => (None, None),
    }
}

fn table_name(section: Option<&str>) -> String {
    section.map_or_else(|| "the top level".to_string(), |s| format!("[{s}]"))
}

/// Converts every error carried by a Figment failure into a diagnostic.
///
/// `toml_sources` holds `(name, content)` pairs for the files that were
/// read, plus [`INLINE_SOURCE`] for string configuration.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    let origin = Origin::of(error);
    match &error.kind {
        Kind::UnknownField(field, expected) => unknown_field(error, field, expected, &origin, sources),
        Kind::MissingField(field) => {
            let mut path = error.path.clone();
            path.push(field.to_string());
            ConfigError::MissingKey {
                key: path.join("."),
            }
        }
        Kind::InvalidType(actual, expected) => {
            let (section, key) = match error.path.as_slice() {
                [section, key] => (Some(section.as_str()), key.as_str()),
                [.., key] => (None, key.as_str()),
                [] => (None, ""),
            };
            let (span, src) = span_for(&origin, sources, Target::Key { section, key });
            ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.clone(),
                origin: origin.describe(&error.path),
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

fn unknown_field(
    error: &figment::Error,
    field: &str,
    expected: &[&str],
    origin: &Origin,
    sources: &[(String, String)],
) -> ConfigError {
    let section = error.path.first().map(String::as_str);
    let homes = sections_with_key(field, section);

    if !homes.is_empty() {
        let (span, src) = span_for(origin, sources, Target::Key { section, key: field });
        return ConfigError::MisplacedKey {
            key: field.to_string(),
            table: table_name(section),
            belongs_in: homes
                .iter()
                .map(|s| format!("[{s}]"))
                .collect::<Vec<_>>()
                .join(" or "),
            span,
            src,
        };
    }

    let target = match section {
        None => Target::Section(field),
        Some(_) => Target::Key { section, key: field },
    };
    let (span, src) = match span_for(origin, sources, target) {
        (None, _) if section.is_none() => {
            span_for(origin, sources, Target::Key { section: None, key: field })
        }
        found => found,
    };

    let mut path = error.path.clone();
    path.push(field.to_string());
    ConfigError::UnknownKey {
        key: field.to_string(),
        table: table_name(section),
        suggestion: suggest_key(field, expected),
        valid_keys: expected.join(", "),
        origin: origin.describe(&path),
        span,
        src,
    }
}

/// Byte offset of `key = ...` inside `[section]`, or the root table when
/// `section` is `None`.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut table: Option<&str> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        if let Some(header) = trimmed.strip_prefix('[') {
            table = header.split(']').next().map(str::trim);
        } else if table == section
            && trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// Byte offset of the name inside a `[section]` header.
pub fn locate_section(content: &str, section: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(header) = trimmed.strip_prefix('[')
            && header.split(']').next().map(str::trim) == Some(section)
        {
            let name_at = header.len() - header.trim_start().len();
            return Some(offset + (line.len() - trimmed.len()) + 1 + name_at);
        }
        offset += line.len();
    }
    None
}

/// Closest candidate to `unknown` by Jaro-Winkler similarity, if any is close.
pub fn suggest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

/// Renders diagnostics with miette's graphical handler.
pub fn render_report(errors: &[ConfigError]) -> String {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        let mut rendered = String::new();
        if handler.render_report(&mut rendered, error).is_ok() {
            out.push_str(&rendered);
        } else {
            let _ = writeln!(out, "Error: {error}");
        }
    }
    out
}

/// Prints diagnostics to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    eprint!("{}", render_report(errors));
}
