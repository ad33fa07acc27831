// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent trait for the natural-language-to-SQL collaborator.

use async_trait::async_trait;

use crate::error::QuerygateError;
use crate::schema::DatabaseSchema;
use crate::types::{ConversationEntry, QueryResult};

/// Everything an agent gets to see for one exchange.
#[derive(Debug, Clone, Copy)]
pub struct AgentRequest<'a> {
    pub question: &'a str,
    pub schema: &'a DatabaseSchema,
    /// Most recent exchanges of the session, oldest first.
    pub recent_history: &'a [ConversationEntry],
}

/// What the agent proposes for one question.
///
/// The SQL is untrusted input to the policy guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentProposal {
    pub sql: Option<String>,
    pub answer_hint: String,
}

impl AgentProposal {
    pub fn answer_only(answer: impl Into<String>) -> Self {
        Self {
            sql: None,
            answer_hint: answer.into(),
        }
    }

    pub fn query(sql: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            sql: Some(sql.into()),
            answer_hint: hint.into(),
        }
    }
}

/// A capability that turns a question plus schema into candidate SQL.
#[async_trait]
pub trait AgentAdapter: Send + Sync + 'static {
    /// Human-readable name of this agent implementation.
    fn name(&self) -> &str;

    /// Proposes SQL (or a direct answer) for the question. Called once per exchange.
    async fn propose_sql(&self, request: AgentRequest<'_>) -> Result<AgentProposal, QuerygateError>;

    /// Phrases the final answer from an executed result.
    ///
    /// Returning `Ok(None)` lets the caller fall back to the proposal's hint.
    async fn compose_answer(
        &self,
        _question: &str,
        _sql: &str,
        _result: &QueryResult,
    ) -> Result<Option<String>, QuerygateError> {
        Ok(None)
    }
}
