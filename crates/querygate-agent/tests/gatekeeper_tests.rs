// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gatekeeper exchanges over a seeded database with scripted agents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use querygate_agent::{Gatekeeper, PassthroughAgent};
use querygate_config::QuerygateConfig;
use querygate_core::{
    AgentAdapter, AgentProposal, AgentRequest, QueryResult, QuerygateError, SessionId,
};
use querygate_storage::{load_schema, seed_sample_database, Database};

/// Proposes fixed SQL and fails every answer composition.
struct FixedSql {
    sql: &'static str,
    compose_calls: AtomicUsize,
}

#[async_trait]
impl AgentAdapter for FixedSql {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn propose_sql(&self, _request: AgentRequest<'_>) -> Result<AgentProposal, QuerygateError> {
        Ok(AgentProposal::query(self.sql, "fallback hint"))
    }

    async fn compose_answer(
        &self,
        _question: &str,
        _sql: &str,
        _result: &QueryResult,
    ) -> Result<Option<String>, QuerygateError> {
        self.compose_calls.fetch_add(1, Ordering::SeqCst);
        Err(QuerygateError::agent("composition unavailable"))
    }
}

/// Takes a while to propose, noting when it finished.
struct SlowAgent {
    delay: Duration,
    proposed_at: Mutex<Option<DateTime<Utc>>>,
}

#[async_trait]
impl AgentAdapter for SlowAgent {
    fn name(&self) -> &str {
        "slow"
    }

    async fn propose_sql(&self, _request: AgentRequest<'_>) -> Result<AgentProposal, QuerygateError> {
        tokio::time::sleep(self.delay).await;
        *self.proposed_at.lock().unwrap() = Some(Utc::now());
        Ok(AgentProposal::query("SELECT COUNT(*) FROM products", "counted"))
    }
}

async fn gatekeeper(agent: Arc<dyn AgentAdapter>) -> (tempfile::TempDir, Gatekeeper) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.db");
    seed_sample_database(&path).await.unwrap();

    let mut config = QuerygateConfig::default();
    config.database.path = path.to_string_lossy().to_string();
    config.database.max_result_rows = 10;
    config.database.enable_query_logging = false;

    let schema = Arc::new(load_schema(&Database::from_config(&config)).await.unwrap());
    (dir, Gatekeeper::from_config(&config, agent, schema))
}

#[tokio::test]
async fn failed_composition_falls_back_to_hint() {
    let agent = Arc::new(FixedSql {
        sql: "SELECT COUNT(*) FROM customers",
        compose_calls: AtomicUsize::new(0),
    });
    let (_dir, gatekeeper) = gatekeeper(agent.clone()).await;

    let entry = gatekeeper
        .handle(&SessionId::from("s"), "how many customers?")
        .await
        .unwrap();
    assert_eq!(entry.answer_text, "fallback hint");
    assert!(!entry.has_error());
    assert_eq!(agent.compose_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_table_is_advisory_only() {
    let agent = Arc::new(FixedSql {
        sql: "SELECT * FROM invoices",
        compose_calls: AtomicUsize::new(0),
    });
    let (_dir, gatekeeper) = gatekeeper(agent.clone()).await;

    let entry = gatekeeper.handle(&SessionId::from("s"), "invoices?").await.unwrap();
    assert!(!entry.was_policy_denied);
    assert!(entry.error_note.unwrap().contains("invoices"));
    assert_eq!(agent.compose_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn passthrough_answers_non_sql_with_table_list() {
    let (_dir, gatekeeper) = gatekeeper(Arc::new(PassthroughAgent)).await;
    assert_eq!(gatekeeper.agent_name(), "passthrough");

    let entry = gatekeeper
        .handle(&SessionId::from("p"), "what can I ask?")
        .await
        .unwrap();
    assert!(entry.generated_sql.is_none());
    assert!(entry.answer_text.contains("order_items"));

    let entry = gatekeeper
        .handle(&SessionId::from("p"), "SELECT * FROM orders")
        .await
        .unwrap();
    assert_eq!(entry.answer_text, "Query executed.");
    assert!(entry.was_truncated());
    assert_eq!(entry.result.unwrap().rows.len(), 10);
}

#[tokio::test]
async fn every_exchange_appends_exactly_one_entry() {
    let (_dir, gatekeeper) = gatekeeper(Arc::new(PassthroughAgent)).await;
    let id = SessionId::from("count");
    for question in ["hello", "SELECT 1", "DROP TABLE orders", "SELECT nope FROM orders"] {
        gatekeeper.handle(&id, question).await.unwrap();
    }
    let session = gatekeeper.registry().get_or_create(&id).await.unwrap();
    assert_eq!(session.len(), 4);
    assert_eq!(session.total_exchanges(), 4);
}

#[tokio::test]
async fn entry_is_stamped_when_the_exchange_completes() {
    let agent = Arc::new(SlowAgent {
        delay: Duration::from_millis(50),
        proposed_at: Mutex::new(None),
    });
    let (_dir, gatekeeper) = gatekeeper(agent.clone()).await;
    let id = SessionId::from("slow");

    let entry = gatekeeper.handle(&id, "how many products?").await.unwrap();
    let proposed_at = agent.proposed_at.lock().unwrap().unwrap();
    assert!(entry.timestamp >= proposed_at);
    assert!(entry.execution_time_ms >= 50);

    let session = gatekeeper.registry().get_or_create(&id).await.unwrap();
    assert_eq!(session.last_activity_at(), entry.timestamp);
}
