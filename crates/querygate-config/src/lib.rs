// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Querygate SQL guardrail.
//!
//! Resolves operating parameters from compiled defaults, an optional
//! `querygate.toml`, and the environment, then validates them. The result is a
//! single immutable [`QuerygateConfig`] built once at startup and passed to every
//! component explicitly.
//!
//! # Usage
//!
//! ```no_run
//! use querygate_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("database: {}", config.database.path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AgentProvider, QuerygateConfig};
pub use validation::{check_database_path, validate_config};

/// Load configuration from `./querygate.toml` and the environment, and validate it.
///
/// Returns either a valid `QuerygateConfig` or every error found.
pub fn load_and_validate() -> Result<QuerygateConfig, Vec<ConfigError>> {
    finish(loader::load_config())
}

/// Like [`load_and_validate`] but reads the given file instead of `./querygate.toml`.
pub fn load_and_validate_from(path: &Path) -> Result<QuerygateConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path))
}

/// Load configuration from a TOML string and validate it. Useful for tests.
pub fn load_and_validate_str(toml_content: &str) -> Result<QuerygateConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content))
}

fn finish(
    loaded: Result<QuerygateConfig, figment::Error>,
) -> Result<QuerygateConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                database = %config.database.path,
                max_result_rows = config.database.max_result_rows,
                allow_destructive = config.database.allow_destructive_queries,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
