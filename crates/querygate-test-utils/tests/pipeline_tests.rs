// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end exchanges through the guarded pipeline.

use chrono::{Duration as ChronoDuration, Utc};
use querygate_core::{AgentProposal, CellValue, PolicyDenial, QuerygateError, StatementKind};
use querygate_test_utils::TestHarness;

#[tokio::test]
async fn row_cap_denial_and_multi_statement_scenario() {
    let harness = TestHarness::builder()
        .max_result_rows(5)
        .allow_destructive(false)
        .build()
        .await
        .unwrap();

    let listed = harness.ask("s1", "SELECT * FROM products").await.unwrap();
    let result = listed.result.as_ref().unwrap();
    assert_eq!(result.rows.len(), 5);
    assert!(result.row_count_truncated);
    assert!(listed.was_truncated());
    assert!(!listed.was_policy_denied);

    let deleted = harness.ask("s1", "DELETE FROM products").await.unwrap();
    assert!(deleted.was_policy_denied);
    assert!(deleted.result.is_none());
    assert_eq!(
        deleted.denial,
        Some(PolicyDenial::DestructiveQueryBlocked {
            kind: StatementKind::Write
        })
    );

    let batch = harness.ask("s1", "DROP TABLE products; SELECT 1").await.unwrap();
    assert_eq!(batch.denial, Some(PolicyDenial::MultiStatementRejected));
    assert!(batch.result.is_none());

    // Neither denied statement touched the table.
    let counted = harness.ask("s1", "SELECT COUNT(*) FROM products").await.unwrap();
    assert_eq!(
        counted.result.unwrap().rows[0][0],
        CellValue::Integer(50)
    );

    let session = harness.registry().get_or_create(&"s1".into()).await.unwrap();
    assert_eq!(session.len(), 4);
}

#[tokio::test]
async fn destructive_statements_run_when_enabled() {
    let harness = TestHarness::builder()
        .products_only(3)
        .allow_destructive(true)
        .build()
        .await
        .unwrap();

    let entry = harness
        .ask("w", "UPDATE products SET price = 1")
        .await
        .unwrap();
    assert!(!entry.was_policy_denied);
    assert_eq!(entry.result.as_ref().unwrap().rows_affected, 3);
    assert_eq!(entry.answer_text, "3 row(s) affected.");
}

#[tokio::test]
async fn unrecognized_statement_is_recorded_as_denied() {
    let harness = TestHarness::builder().products_only(1).build().await.unwrap();
    let entry = harness.ask("u", "PRAGMA table_info(products)").await.unwrap();
    assert_eq!(entry.denial, Some(PolicyDenial::UnrecognizedStatement));
    assert!(entry.answer_text.starts_with("I can't run that query"));
}

#[tokio::test]
async fn backend_error_is_recorded_not_returned() {
    let harness = TestHarness::builder().products_only(1).build().await.unwrap();
    let entry = harness.ask("e", "SELECT missing_column FROM products").await.unwrap();
    assert!(entry.has_error());
    assert!(!entry.was_policy_denied);
    assert!(entry.result.is_none());
    assert!(entry.error_note.unwrap().contains("missing_column"));
}

#[tokio::test]
async fn agent_failure_and_answer_only_paths() {
    let harness = TestHarness::builder()
        .products_only(2)
        .with_proposals(vec![AgentProposal::answer_only("There are two tables.")])
        .build()
        .await
        .unwrap();
    harness.agent.push_failure("model unavailable").await;

    let answered = harness.ask("a", "how many tables?").await.unwrap();
    assert_eq!(answered.answer_text, "There are two tables.");
    assert!(answered.generated_sql.is_none());
    assert!(!answered.has_error());

    let failed = harness.ask("a", "anything").await.unwrap();
    assert!(failed.has_error());
    assert!(failed.generated_sql.is_none());
    assert!(failed.error_note.unwrap().contains("model unavailable"));
}

#[tokio::test]
async fn composed_answer_wins_over_hint_and_summary() {
    let harness = TestHarness::builder()
        .products_only(4)
        .with_proposals(vec![
            AgentProposal::query("SELECT COUNT(*) FROM products", "hint text"),
            AgentProposal::query("SELECT COUNT(*) FROM products", "hint text"),
        ])
        .build()
        .await
        .unwrap();
    harness.agent.push_answer("You have 4 products.").await;

    let composed = harness.ask("c", "how many products?").await.unwrap();
    assert_eq!(composed.answer_text, "You have 4 products.");

    let hinted = harness.ask("c", "and again?").await.unwrap();
    assert_eq!(hinted.answer_text, "hint text");
}

#[tokio::test]
async fn history_is_capped_and_recent_context_is_passed() {
    let harness = TestHarness::builder()
        .products_only(1)
        .max_history(2)
        .recent_context(1)
        .build()
        .await
        .unwrap();

    for i in 0..4 {
        harness.ask("h", &format!("SELECT {i}")).await.unwrap();
    }

    let session = harness.registry().get_or_create(&"h".into()).await.unwrap();
    let questions: Vec<&str> = session.history().map(|e| e.question.as_str()).collect();
    assert_eq!(questions, vec!["SELECT 2", "SELECT 3"]);
    assert_eq!(session.total_exchanges(), 4);
    drop(session);

    let seen = harness.agent.seen().await;
    assert_eq!(seen[0].history_len, 0);
    assert!(seen[1..].iter().all(|s| s.history_len == 1));
    assert_eq!(seen[0].table_count, 1);
}

#[tokio::test]
async fn sessions_are_independent() {
    let harness = TestHarness::builder().products_only(1).build().await.unwrap();
    harness.ask("one", "SELECT 1").await.unwrap();
    harness.ask("two", "SELECT 2").await.unwrap();
    harness.ask("two", "SELECT 3").await.unwrap();

    assert_eq!(harness.registry().len(), 2);
    let one = harness.registry().get_or_create(&"one".into()).await.unwrap();
    assert_eq!(one.len(), 1);
}

#[tokio::test]
async fn swept_session_reports_expiry() {
    let harness = TestHarness::builder()
        .products_only(1)
        .session_timeout_minutes(1)
        .build()
        .await
        .unwrap();
    harness.ask("idle", "SELECT 1").await.unwrap();

    let removed = harness
        .registry()
        .sweep_expired(Utc::now() + ChronoDuration::minutes(5));
    assert_eq!(removed, 1);

    let err = harness.ask("idle", "SELECT 1").await.unwrap_err();
    assert!(matches!(err, QuerygateError::SessionExpired { session_id } if session_id == "idle"));
    assert!(harness.ask("fresh", "SELECT 1").await.is_ok());
}

#[tokio::test]
async fn destroyed_session_cannot_be_resumed() {
    let harness = TestHarness::builder().products_only(1).build().await.unwrap();
    harness.ask("gone", "SELECT 1").await.unwrap();
    assert!(harness.registry().destroy(&"gone".into()));

    let err = harness.ask("gone", "SELECT 1").await.unwrap_err();
    assert!(matches!(err, QuerygateError::SessionExpired { .. }));
}

#[tokio::test]
async fn concurrent_exchanges_on_one_session_all_land() {
    let harness = std::sync::Arc::new(
        TestHarness::builder()
            .products_only(10)
            .max_history(50)
            .build()
            .await
            .unwrap(),
    );

    let mut tasks = Vec::new();
    for i in 0..8 {
        let harness = std::sync::Arc::clone(&harness);
        tasks.push(tokio::spawn(async move {
            harness.ask("shared", &format!("SELECT {i}")).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let session = harness.registry().get_or_create(&"shared".into()).await.unwrap();
    assert_eq!(session.len(), 8);
}
