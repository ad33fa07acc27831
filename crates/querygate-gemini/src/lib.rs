// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini agent adapter for Querygate.
//!
//! Implements [`AgentAdapter`] over the Gemini `generateContent` REST API:
//! one call proposes SQL for a question, and a second call phrases the answer
//! once the guarded execution has produced a result.

pub mod client;
pub mod prompt;
pub mod types;

use async_trait::async_trait;
use querygate_config::QuerygateConfig;
use querygate_core::{AgentAdapter, AgentProposal, AgentRequest, QueryResult, QuerygateError};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateRequest, GenerationConfig};

/// Gemini-backed SQL agent.
pub struct GeminiAgent {
    client: GeminiClient,
}

impl GeminiAgent {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    /// Creates the agent from the `[agent]` section.
    ///
    /// Fails with `Config` when no API key is configured.
    pub fn from_config(config: &QuerygateConfig) -> Result<Self, QuerygateError> {
        let api_key = config
            .agent
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                QuerygateError::Config(
                    "no Gemini API key configured; set GOOGLE_API_KEY or agent.api_key".into(),
                )
            })?;
        let client = GeminiClient::new(
            api_key,
            config.agent.model.clone(),
            config.agent.base_url.clone(),
        )?;
        info!(model = %config.agent.model, "Gemini agent initialized");
        Ok(Self::new(client))
    }

    async fn ask(&self, system: String, contents: Vec<Content>) -> Result<String, QuerygateError> {
        let request = GenerateRequest {
            contents,
            system_instruction: Some(Content::system(system)),
            generation_config: GenerationConfig::default(),
        };
        let response = self.client.generate(&request).await?;
        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }
        response.text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".into());
            QuerygateError::agent(format!("Gemini returned no text ({reason})"))
        })
    }
}

#[async_trait]
impl AgentAdapter for GeminiAgent {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn propose_sql(&self, request: AgentRequest<'_>) -> Result<AgentProposal, QuerygateError> {
        let system = prompt::sql_instruction(&request.schema.describe());
        let reply = self.ask(system, prompt::sql_contents(&request)).await?;
        let proposal = prompt::parse_reply(&reply);
        debug!(has_sql = proposal.sql.is_some(), "Gemini proposal parsed");
        Ok(proposal)
    }

    async fn compose_answer(
        &self,
        question: &str,
        sql: &str,
        result: &QueryResult,
    ) -> Result<Option<String>, QuerygateError> {
        let user = prompt::answer_prompt(question, sql, result);
        let reply = self
            .ask(prompt::ANSWER_INSTRUCTION.to_string(), vec![Content::user(user)])
            .await?;
        let reply = reply.trim();
        Ok((!reply.is_empty()).then(|| reply.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use querygate_core::DatabaseSchema;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn agent(server: &MockServer) -> GeminiAgent {
        let client = GeminiClient::new("k", "gemini-test".into(), server.uri())
            .unwrap()
            .with_retry_delay(Duration::ZERO);
        GeminiAgent::new(client)
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
        }))
    }

    #[test]
    fn from_config_requires_api_key() {
        let config = QuerygateConfig::default();
        assert!(matches!(
            GeminiAgent::from_config(&config),
            Err(QuerygateError::Config(_))
        ));
    }

    #[tokio::test]
    async fn propose_sql_parses_fenced_reply_at_temperature_zero() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"temperature": 0.0}
            })))
            .respond_with(reply("```sql\nSELECT COUNT(*) FROM orders\n```\nCounts orders."))
            .mount(&server)
            .await;

        let schema = DatabaseSchema::default();
        let proposal = agent(&server)
            .propose_sql(AgentRequest {
                question: "how many orders?",
                schema: &schema,
                recent_history: &[],
            })
            .await
            .unwrap();
        assert_eq!(proposal.sql.as_deref(), Some("SELECT COUNT(*) FROM orders"));
        assert_eq!(proposal.answer_hint, "Counts orders.");
    }

    #[tokio::test]
    async fn compose_answer_returns_trimmed_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("  There are 200 orders.\n"))
            .mount(&server)
            .await;

        let result = QueryResult {
            sql: "SELECT COUNT(*) FROM orders".into(),
            columns: vec!["COUNT(*)".into()],
            rows: vec![vec![querygate_core::CellValue::Integer(200)]],
            row_count_returned: 1,
            row_count_truncated: false,
            rows_affected: 0,
            execution_duration_ms: 1,
        };
        let answer = agent(&server)
            .compose_answer("how many orders?", &result.sql, &result)
            .await
            .unwrap();
        assert_eq!(answer.as_deref(), Some("There are 200 orders."));
    }

    #[tokio::test]
    async fn empty_candidates_is_an_agent_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let schema = DatabaseSchema::default();
        let err = agent(&server)
            .propose_sql(AgentRequest {
                question: "q",
                schema: &schema,
                recent_history: &[],
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"), "{err}");
    }
}
