// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typo in `querygate.toml`
//! is reported at startup instead of silently falling back to a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Querygate configuration.
///
/// Built once at startup and shared read-only by every component.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuerygateConfig {
    /// Target database and execution limits.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Conversation session limits.
    #[serde(default)]
    pub session: SessionConfig,

    /// SQL-generating agent settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP gateway bind settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl QuerygateConfig {
    /// Bounded executor deadline.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.database.query_timeout_secs)
    }

    /// Idle window after which a session expires.
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session.timeout_minutes.saturating_mul(60))
    }

    /// Period of the background idle sweep.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session.sweep_interval_secs)
    }

    /// Returns a copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.agent.api_key.is_some() {
            copy.agent.api_key = Some("***".to_string());
        }
        copy
    }
}

/// Database location and bounded-execution limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Hard wall-clock limit per query, in seconds.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Hard cap on rows returned per query.
    #[serde(default = "default_max_result_rows")]
    pub max_result_rows: usize,

    /// Allow WRITE and SCHEMA_CHANGE statements.
    #[serde(default)]
    pub allow_destructive_queries: bool,

    /// Emit statement text, duration and row count for every execution.
    #[serde(default = "default_true")]
    pub enable_query_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            query_timeout_secs: default_query_timeout_secs(),
            max_result_rows: default_max_result_rows(),
            allow_destructive_queries: false,
            enable_query_logging: true,
        }
    }
}

fn default_database_path() -> String {
    "sample_database.db".to_string()
}

fn default_query_timeout_secs() -> u64 {
    30
}

fn default_max_result_rows() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

/// Conversation session limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// History capacity per session; the oldest entry is evicted beyond this.
    #[serde(default = "default_max_conversation_history")]
    pub max_conversation_history: usize,

    /// Idle minutes before a session expires.
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,

    /// Seconds between background idle sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_conversation_history: default_max_conversation_history(),
            timeout_minutes: default_timeout_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_max_conversation_history() -> usize {
    50
}

fn default_timeout_minutes() -> u64 {
    60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// Which agent implementation proposes SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentProvider {
    /// Google Gemini via the `generateContent` REST API.
    #[default]
    Gemini,
    /// Input that starts with a SQL keyword is used verbatim as the SQL.
    Passthrough,
}

impl std::fmt::Display for AgentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentProvider::Gemini => write!(f, "gemini"),
            AgentProvider::Passthrough => write!(f, "passthrough"),
        }
    }
}

/// SQL-generating agent settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default)]
    pub provider: AgentProvider,

    /// API key for the Gemini provider. Required when `provider = "gemini"`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of recent exchanges passed to the agent as context.
    #[serde(default = "default_recent_context")]
    pub recent_context: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: AgentProvider::default(),
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            recent_context: default_recent_context(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_recent_context() -> usize {
    5
}

/// HTTP gateway bind settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = QuerygateConfig::default();
        assert_eq!(config.database.path, "sample_database.db");
        assert_eq!(config.query_timeout(), Duration::from_secs(30));
        assert_eq!(config.database.max_result_rows, 1000);
        assert!(!config.database.allow_destructive_queries);
        assert_eq!(config.session.max_conversation_history, 50);
        assert_eq!(config.session_idle_timeout(), Duration::from_secs(3600));
        assert!(config.database.enable_query_logging);
    }

    #[test]
    fn redacted_masks_api_key() {
        let mut config = QuerygateConfig::default();
        config.agent.api_key = Some("secret-key".into());
        let redacted = config.redacted();
        assert_eq!(redacted.agent.api_key.as_deref(), Some("***"));
        assert_eq!(config.agent.api_key.as_deref(), Some("secret-key"));
    }

    #[test]
    fn redacted_leaves_missing_key_missing() {
        let config = QuerygateConfig::default();
        assert!(config.redacted().agent.api_key.is_none());
    }

    #[test]
    fn provider_deserializes_lowercase() {
        let config: QuerygateConfig = toml::from_str("[agent]\nprovider = \"passthrough\"\n").unwrap();
        assert_eq!(config.agent.provider, AgentProvider::Passthrough);
    }
}
