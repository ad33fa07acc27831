// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SQL agent for deterministic testing.
//!
//! `MockAgent` implements `AgentAdapter` with pre-configured proposals,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use querygate_core::{AgentAdapter, AgentProposal, AgentRequest, QueryResult, QuerygateError};

/// What the agent was asked, captured for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub question: String,
    pub history_len: usize,
    pub table_count: usize,
}

/// A mock agent that returns pre-configured proposals.
///
/// Proposals are popped from a FIFO queue. When the queue is empty the
/// question itself is proposed as SQL, so tests can simply "ask" SQL text.
#[derive(Default)]
pub struct MockAgent {
    proposals: Mutex<VecDeque<Result<AgentProposal, String>>>,
    answers: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<SeenRequest>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock agent pre-loaded with the given proposals.
    pub fn with_proposals(proposals: Vec<AgentProposal>) -> Self {
        Self {
            proposals: Mutex::new(proposals.into_iter().map(Ok).collect()),
            ..Self::default()
        }
    }

    pub async fn push_proposal(&self, proposal: AgentProposal) {
        self.proposals.lock().await.push_back(Ok(proposal));
    }

    /// Queue a failure for the next `propose_sql` call.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.proposals.lock().await.push_back(Err(message.into()));
    }

    /// Queue a phrased answer for the next `compose_answer` call.
    pub async fn push_answer(&self, answer: impl Into<String>) {
        self.answers.lock().await.push_back(answer.into());
    }

    /// Every request seen so far, oldest first.
    pub async fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl AgentAdapter for MockAgent {
    fn name(&self) -> &str {
        "mock-agent"
    }

    async fn propose_sql(&self, request: AgentRequest<'_>) -> Result<AgentProposal, QuerygateError> {
        self.seen.lock().await.push(SeenRequest {
            question: request.question.to_string(),
            history_len: request.recent_history.len(),
            table_count: request.schema.tables.len(),
        });

        match self.proposals.lock().await.pop_front() {
            Some(Ok(proposal)) => Ok(proposal),
            Some(Err(message)) => Err(QuerygateError::agent(message)),
            None => Ok(AgentProposal::query(request.question, "")),
        }
    }

    async fn compose_answer(
        &self,
        _question: &str,
        _sql: &str,
        _result: &QueryResult,
    ) -> Result<Option<String>, QuerygateError> {
        Ok(self.answers.lock().await.pop_front())
    }
}
