// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembles the exchange pipeline shared by `shell` and `serve`.

use std::sync::Arc;

use querygate_agent::{Gatekeeper, PassthroughAgent};
use querygate_config::{AgentProvider, QuerygateConfig};
use querygate_core::{AgentAdapter, QuerygateError};
use querygate_storage::{load_schema, Database};
use tracing::info;

/// Creates the agent selected by `agent.provider`.
pub fn build_agent(config: &QuerygateConfig) -> Result<Arc<dyn AgentAdapter>, QuerygateError> {
    match config.agent.provider {
        #[cfg(feature = "gemini")]
        AgentProvider::Gemini => Ok(Arc::new(querygate_gemini::GeminiAgent::from_config(config)?)),
        #[cfg(not(feature = "gemini"))]
        AgentProvider::Gemini => Err(QuerygateError::Config(
            "this build does not include the gemini agent; set agent.provider = \"passthrough\"".into(),
        )),
        AgentProvider::Passthrough => Ok(Arc::new(PassthroughAgent)),
    }
}

/// Loads the schema and wires agent, guard, executor and sessions together.
pub async fn build_gatekeeper(config: &QuerygateConfig) -> Result<Arc<Gatekeeper>, QuerygateError> {
    let agent = build_agent(config)?;
    let schema = load_schema(&Database::from_config(config)).await?;
    info!(
        database = %config.database.path,
        tables = schema.tables.len(),
        agent = agent.name(),
        allow_destructive = config.database.allow_destructive_queries,
        "pipeline ready"
    );
    Ok(Arc::new(Gatekeeper::from_config(config, agent, Arc::new(schema))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_provider_needs_no_key() {
        let mut config = QuerygateConfig::default();
        config.agent.provider = AgentProvider::Passthrough;
        assert_eq!(build_agent(&config).unwrap().name(), "passthrough");
    }

    #[test]
    fn gemini_provider_without_key_fails() {
        let config = QuerygateConfig::default();
        assert!(matches!(build_agent(&config), Err(QuerygateError::Config(_))));
    }

    #[tokio::test]
    async fn gatekeeper_over_sample_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.db");
        querygate_storage::seed_sample_database(&path).await.unwrap();

        let mut config = QuerygateConfig::default();
        config.agent.provider = AgentProvider::Passthrough;
        config.database.path = path.to_string_lossy().to_string();

        let gatekeeper = build_gatekeeper(&config).await.unwrap();
        assert_eq!(gatekeeper.schema().tables.len(), 5);
        let entry = gatekeeper
            .handle(&"t".into(), "SELECT COUNT(*) FROM employees")
            .await
            .unwrap();
        assert_eq!(entry.result.unwrap().rows[0][0], querygate_core::CellValue::Integer(20));
    }
}
