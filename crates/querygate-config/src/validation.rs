// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Type errors are caught by Figment; this module enforces the semantic
//! constraints: positive limits with sane upper bounds, a non-empty database
//! path, a known log level, and the credential required by the selected agent.

use std::path::Path;

use crate::diagnostic::{display_key, ConfigError};
use crate::model::{AgentProvider, QuerygateConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const ONE_DAY_SECS: u64 = 86_400;
const MAX_HISTORY: u64 = 100_000;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns every violation found rather than stopping at the first.
pub fn validate_config(config: &QuerygateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.database.path.trim().is_empty() {
        errors.push(ConfigError::missing(
            display_key("database.path"),
            "set DATABASE_PATH to the SQLite file to query",
        ));
    }

    let positive: [(&str, u64); 5] = [
        ("database.query_timeout_secs", config.database.query_timeout_secs),
        ("database.max_result_rows", config.database.max_result_rows as u64),
        (
            "session.max_conversation_history",
            config.session.max_conversation_history as u64,
        ),
        ("session.timeout_minutes", config.session.timeout_minutes),
        ("session.sweep_interval_secs", config.session.sweep_interval_secs),
    ];
    for (key, value) in positive {
        if value == 0 {
            errors.push(ConfigError::invalid(
                display_key(key),
                "must be greater than zero",
            ));
        }
    }

    let bounded: [(&str, u64, u64); 3] = [
        ("database.query_timeout_secs", config.database.query_timeout_secs, ONE_DAY_SECS),
        (
            "session.max_conversation_history",
            config.session.max_conversation_history as u64,
            MAX_HISTORY,
        ),
        ("session.sweep_interval_secs", config.session.sweep_interval_secs, ONE_DAY_SECS),
    ];
    for (key, value, max) in bounded {
        if value > max {
            errors.push(ConfigError::invalid(
                display_key(key),
                format!("must be at most {max}"),
            ));
        }
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::invalid(
            display_key("logging.level"),
            format!(
                "`{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }

    if config.agent.provider == AgentProvider::Gemini
        && config
            .agent
            .api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
    {
        errors.push(ConfigError::missing(
            "GOOGLE_API_KEY",
            "export GOOGLE_API_KEY=<key>, or set AGENT_PROVIDER=passthrough to type SQL directly",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that the database path names an existing, readable regular file.
pub fn check_database_path(path: &str) -> Result<(), ConfigError> {
    let missing = || {
        ConfigError::missing(
            display_key("database.path"),
            format!("database file `{path}` not found; run `querygate seed {path}` to create sample data"),
        )
    };

    let path_ref = Path::new(path);
    let metadata = std::fs::metadata(path_ref).map_err(|_| missing())?;
    if !metadata.is_file() {
        return Err(ConfigError::invalid(
            display_key("database.path"),
            format!("`{path}` is not a regular file"),
        ));
    }
    std::fs::File::open(path_ref).map_err(|e| {
        ConfigError::invalid(display_key("database.path"), format!("`{path}` is not readable: {e}"))
    })?;
    Ok(())
}
