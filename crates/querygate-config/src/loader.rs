// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `querygate/querygate.toml` in the user config directory
//! 3. `./querygate.toml`
//! 4. The environment variables listed in [`ENV_KEYS`](crate::diagnostic::ENV_KEYS)
//!
//! An explicit file path replaces layers 2 and 3.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::diagnostic::ENV_KEYS;
use crate::model::QuerygateConfig;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "querygate.toml";

/// Load configuration from `./querygate.toml` (if present) and the environment.
pub fn load_config() -> Result<QuerygateConfig, figment::Error> {
    build_figment(None).extract()
}

/// Load configuration from a specific file path with environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuerygateConfig, figment::Error> {
    build_figment(Some(path)).extract()
}

/// Load configuration from a TOML string only. The environment is not consulted.
pub fn load_config_from_str(toml_content: &str) -> Result<QuerygateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuerygateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Build the Figment used for config loading.
pub fn build_figment(file: Option<&Path>) -> Figment {
    let figment = Figment::new().merge(Serialized::defaults(QuerygateConfig::default()));
    let figment = match file {
        Some(path) => figment.merge(Toml::file(path)),
        None => figment
            .merge(Toml::file(user_config_file().unwrap_or_default()))
            .merge(Toml::file(DEFAULT_CONFIG_FILE)),
    };
    figment.merge(env_provider())
}

/// `<config dir>/querygate/querygate.toml`, when the platform has a config dir.
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("querygate").join(DEFAULT_CONFIG_FILE))
}

/// Environment provider for the flat, unprefixed variable names.
///
/// Uses an explicit lookup instead of `Env::split("_")`: `MAX_RESULT_ROWS`
/// must become `database.max_result_rows`, not `max.result.rows`.
fn env_provider() -> Env {
    let names: Vec<&'static str> = ENV_KEYS.iter().map(|(env, _)| *env).collect();
    Env::raw().only(&names).map(|key| {
        let key_str = key.as_str();
        ENV_KEYS
            .iter()
            .find(|(env, _)| env.eq_ignore_ascii_case(key_str))
            .map(|(_, path)| (*path).to_string())
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}
