// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent that forwards typed SQL unchanged.
//!
//! Useful without an LLM key: anything that starts like a SQL statement is
//! proposed verbatim (and still goes through the policy guard); anything else
//! gets a short help text listing the tables.

use async_trait::async_trait;
use querygate_core::{AgentAdapter, AgentProposal, AgentRequest, QuerygateError};

const SQL_LEADERS: &[&str] = &[
    "SELECT", "WITH", "EXPLAIN", "INSERT", "UPDATE", "DELETE", "REPLACE", "CREATE", "ALTER",
    "DROP", "TRUNCATE", "PRAGMA", "VACUUM", "ATTACH",
];

/// Treats questions that look like SQL as the SQL to run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughAgent;

impl PassthroughAgent {
    fn looks_like_sql(text: &str) -> bool {
        let first = text
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
            .next()
            .unwrap_or_default();
        SQL_LEADERS.iter().any(|kw| first.eq_ignore_ascii_case(kw))
    }
}

#[async_trait]
impl AgentAdapter for PassthroughAgent {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn propose_sql(&self, request: AgentRequest<'_>) -> Result<AgentProposal, QuerygateError> {
        let question = request.question.trim();
        if Self::looks_like_sql(question) {
            return Ok(AgentProposal::query(question, "Query executed."));
        }

        let tables = request.schema.table_names();
        let hint = if tables.is_empty() {
            "Type a SQL statement to run it against the database.".to_string()
        } else {
            format!(
                "Type a SQL statement to run it. Available tables: {}.",
                tables.join(", ")
            )
        };
        Ok(AgentProposal::answer_only(hint))
    }
}

#[cfg(test)]
mod tests {
    use querygate_core::DatabaseSchema;

    use super::*;

    async fn propose(question: &str) -> AgentProposal {
        let schema = DatabaseSchema::default();
        PassthroughAgent
            .propose_sql(AgentRequest {
                question,
                schema: &schema,
                recent_history: &[],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn sql_is_forwarded_verbatim() {
        let proposal = propose("  select count(*) from products ").await;
        assert_eq!(proposal.sql.as_deref(), Some("select count(*) from products"));
    }

    #[tokio::test]
    async fn destructive_sql_is_forwarded_for_the_guard_to_judge() {
        let proposal = propose("DROP TABLE products").await;
        assert_eq!(proposal.sql.as_deref(), Some("DROP TABLE products"));
    }

    #[tokio::test]
    async fn prose_gets_help_text() {
        let proposal = propose("how many products are there?").await;
        assert!(proposal.sql.is_none());
        assert!(proposal.answer_hint.contains("SQL statement"));
    }
}
