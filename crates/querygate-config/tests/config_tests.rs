// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Querygate configuration system.

use std::time::Duration;

use querygate_config::{
    load_and_validate, load_and_validate_from, load_and_validate_str, load_config_from_str,
    AgentProvider, ConfigError,
};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[database]
path = "/tmp/shop.db"
query_timeout_secs = 10
max_result_rows = 5
allow_destructive_queries = true
enable_query_logging = false

[session]
max_conversation_history = 3
timeout_minutes = 2
sweep_interval_secs = 15

[agent]
provider = "passthrough"
recent_context = 2

[gateway]
host = "0.0.0.0"
port = 9000

[logging]
level = "debug"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.database.path, "/tmp/shop.db");
    assert_eq!(config.query_timeout(), Duration::from_secs(10));
    assert_eq!(config.database.max_result_rows, 5);
    assert!(config.database.allow_destructive_queries);
    assert!(!config.database.enable_query_logging);
    assert_eq!(config.session.max_conversation_history, 3);
    assert_eq!(config.session_idle_timeout(), Duration::from_secs(120));
    assert_eq!(config.sweep_interval(), Duration::from_secs(15));
    assert_eq!(config.agent.provider, AgentProvider::Passthrough);
    assert_eq!(config.agent.recent_context, 2);
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.logging.level, "debug");
}

/// Unknown field in [database] is rejected.
#[test]
fn unknown_field_in_database_produces_error() {
    let toml = "[database]\nmax_rows = 5\n";
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_rows"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_key_reports_suggestion() {
    let errors = load_and_validate_str("[session]\ntimeout_minute = 5\n").unwrap_err();
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "timeout_minutes"
    )));
}

#[test]
fn zero_row_cap_is_invalid_value() {
    let errors = load_and_validate_str(
        "[database]\nmax_result_rows = 0\n[agent]\nprovider = \"passthrough\"\n",
    )
    .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ConfigError::InvalidValue { key, .. } if key.contains("MAX_RESULT_ROWS")));
}

#[test]
fn negative_timeout_is_invalid_value() {
    let errors = load_and_validate_str(
        "[database]\nquery_timeout_secs = -5\n[agent]\nprovider = \"passthrough\"\n",
    )
    .unwrap_err();
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::InvalidValue { .. })));
}

#[test]
fn unknown_provider_is_invalid_value() {
    let errors = load_and_validate_str("[agent]\nprovider = \"oracle\"\n").unwrap_err();
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidValue { detail, .. } if detail.contains("oracle"))));
}

#[test]
fn environment_drives_validation() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("AGENT_PROVIDER", "passthrough");
        jail.set_env("MAX_CONVERSATION_HISTORY", "0");
        let errors = load_and_validate().expect_err("zero history must fail");
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::InvalidValue { key, .. } if key.contains("MAX_CONVERSATION_HISTORY")
        )));
        Ok(())
    });
}

#[test]
fn environment_unparsable_number_names_variable() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("AGENT_PROVIDER", "passthrough");
        jail.set_env("MAX_RESULT_ROWS", "plenty");
        let errors = load_and_validate().expect_err("unparsable value must fail");
        assert!(errors.iter().any(|e| matches!(
            e,
            ConfigError::InvalidValue { key, .. } if key.contains("MAX_RESULT_ROWS")
        )));
        Ok(())
    });
}

#[test]
fn explicit_file_is_layered_under_environment() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            "[agent]\nprovider = \"passthrough\"\n[database]\nmax_result_rows = 25\n",
        )?;
        jail.set_env("ENABLE_QUERY_LOGGING", "false");
        let config = load_and_validate_from(std::path::Path::new("custom.toml"))
            .expect("file config should validate");
        assert_eq!(config.database.max_result_rows, 25);
        assert!(!config.database.enable_query_logging);
        Ok(())
    });
}

#[test]
fn redacted_config_serializes_without_secret() {
    let mut config = load_and_validate_str("[agent]\napi_key = \"top-secret\"\n").unwrap();
    config.agent.model = "gemini-2.0-flash".into();
    let json = serde_json::to_string(&config.redacted()).unwrap();
    assert!(!json.contains("top-secret"));
    assert!(json.contains("***"));
}
