// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration errors and the Figment-to-miette bridge.
//!
//! Figment extraction errors are converted into [`ConfigError`] values that
//! name the environment variable (or TOML key) at fault, with "did you mean?"
//! suggestions for unknown TOML keys.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A fatal configuration error detected at startup.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ConfigError {
    /// A mandatory credential or path is absent.
    #[error("missing required value `{key}`")]
    #[diagnostic(code(querygate::config::missing_required), help("{help}"))]
    MissingRequired {
        /// Environment variable (or TOML key) that must be set.
        key: String,
        /// How to provide it.
        help: String,
    },

    /// A value is present but unparsable or out of range.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(querygate::config::invalid_value))]
    InvalidValue {
        key: String,
        detail: String,
    },

    /// An unrecognized key in a TOML configuration file.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(querygate::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
    },
}

impl ConfigError {
    pub fn missing(key: impl Into<String>, help: impl Into<String>) -> Self {
        ConfigError::MissingRequired {
            key: key.into(),
            help: help.into(),
        }
    }

    pub fn invalid(key: impl Into<String>, detail: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            detail: detail.into(),
        }
    }
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Environment variable names and the dotted config paths they map to.
pub const ENV_KEYS: &[(&str, &str)] = &[
    ("DATABASE_PATH", "database.path"),
    ("MAX_QUERY_TIMEOUT", "database.query_timeout_secs"),
    ("MAX_RESULT_ROWS", "database.max_result_rows"),
    ("ALLOW_DESTRUCTIVE_QUERIES", "database.allow_destructive_queries"),
    ("ENABLE_QUERY_LOGGING", "database.enable_query_logging"),
    ("MAX_CONVERSATION_HISTORY", "session.max_conversation_history"),
    ("SESSION_TIMEOUT_MINUTES", "session.timeout_minutes"),
    ("SESSION_SWEEP_INTERVAL", "session.sweep_interval_secs"),
    ("AGENT_PROVIDER", "agent.provider"),
    ("GOOGLE_API_KEY", "agent.api_key"),
    ("GEMINI_MODEL", "agent.model"),
    ("GATEWAY_HOST", "gateway.host"),
    ("GATEWAY_PORT", "gateway.port"),
    ("LOG_LEVEL", "logging.level"),
];

/// Returns a display name for a dotted config path: `PATH (ENV_VAR)` when an
/// environment variable feeds it, the bare path otherwise.
pub fn display_key(path: &str) -> String {
    match ENV_KEYS.iter().find(|(_, p)| *p == path) {
        Some((env, _)) => format!("{path} ({env})"),
        None => path.to_string(),
    }
}

/// Convert a `figment::Error` into a list of [`ConfigError`]s.
///
/// Figment errors may chain several failures; each becomes one entry.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    let mut errors = Vec::new();

    for error in err {
        let path = error
            .path
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");

        let config_error = match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &valid_keys),
                    valid_keys: valid_keys.join(", "),
                }
            }
            Kind::MissingField(field) => ConfigError::missing(
                display_key(&join_path(&path, field)),
                "set the environment variable or add the key to querygate.toml",
            ),
            Kind::InvalidType(actual, expected) => ConfigError::invalid(
                display_key(&path),
                format!("found {actual}, expected {expected}"),
            ),
            Kind::InvalidValue(actual, expected) => ConfigError::invalid(
                display_key(&path),
                format!("found {actual}, expected {expected}"),
            ),
            Kind::UnknownVariant(variant, expected) => ConfigError::invalid(
                display_key(&path),
                format!("unknown value `{variant}`, expected one of {}", expected.join(", ")),
            ),
            _ => ConfigError::invalid(display_key(&path), error.to_string()),
        };

        errors.push(config_error);
    }

    errors
}

fn join_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

/// Suggest a similar key name using Jaro-Winkler string similarity.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best_match = None;

    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > best_score {
            best_score = score;
            best_match = Some(key.to_string());
        }
    }

    best_match
}

/// Render a list of [`ConfigError`]s to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        let diagnostic: &dyn Diagnostic = error;
        if handler.render_report(&mut buf, diagnostic).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_close_typo() {
        let valid = &["max_result_rows", "query_timeout_secs", "path"];
        assert_eq!(
            suggest_key("max_result_row", valid),
            Some("max_result_rows".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["path", "max_result_rows"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn display_key_names_env_var() {
        assert_eq!(
            display_key("database.max_result_rows"),
            "database.max_result_rows (MAX_RESULT_ROWS)"
        );
        assert_eq!(display_key("agent.recent_context"), "agent.recent_context");
    }

    #[test]
    fn invalid_type_becomes_invalid_value() {
        let err = toml_error("[database]\nmax_result_rows = \"lots\"\n");
        let errors = figment_to_config_errors(err);
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::InvalidValue { key, .. } if key.contains("MAX_RESULT_ROWS")
        )));
    }

    #[test]
    fn unknown_field_becomes_unknown_key_with_suggestion() {
        let err = toml_error("[database]\nmax_result_row = 5\n");
        let errors = figment_to_config_errors(err);
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "max_result_rows"
        )));
    }

    fn toml_error(content: &str) -> figment::Error {
        crate::loader::load_config_from_str(content).expect_err("config should be rejected")
    }
}
