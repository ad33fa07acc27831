// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The guarded question-to-answer pipeline.
//!
//! [`Gatekeeper::handle`] runs one exchange:
//! check out the session, ask the agent for SQL, authorize it, execute it
//! under limits, and record exactly one [`ConversationEntry`]. Denials and
//! failures are recorded like any other outcome; only session expiry is
//! returned as an error.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use querygate_config::QuerygateConfig;
use querygate_core::{
    AgentAdapter, AgentRequest, ConversationEntry, DatabaseSchema, QueryResult, QuerygateError,
    SessionId,
};
use querygate_guard::{Authorization, PolicyGuard};
use querygate_storage::BoundedExecutor;
use tracing::{debug, info, warn};

use crate::registry::{SessionHandle, SessionRegistry};

/// Wires the agent, guard, executor, and session registry together.
pub struct Gatekeeper {
    registry: Arc<SessionRegistry>,
    guard: PolicyGuard,
    executor: BoundedExecutor,
    agent: Arc<dyn AgentAdapter>,
    schema: Arc<DatabaseSchema>,
    recent_context: usize,
}

impl Gatekeeper {
    pub fn new(
        registry: Arc<SessionRegistry>,
        guard: PolicyGuard,
        executor: BoundedExecutor,
        agent: Arc<dyn AgentAdapter>,
        schema: Arc<DatabaseSchema>,
        recent_context: usize,
    ) -> Self {
        Self {
            registry,
            guard,
            executor,
            agent,
            schema,
            recent_context,
        }
    }

    /// Builds every component from `config`. The guard reports tables
    /// missing from `schema`.
    pub fn from_config(
        config: &QuerygateConfig,
        agent: Arc<dyn AgentAdapter>,
        schema: Arc<DatabaseSchema>,
    ) -> Self {
        Self::new(
            Arc::new(SessionRegistry::from_config(config)),
            PolicyGuard::from_config(config).with_schema(Arc::clone(&schema)),
            BoundedExecutor::from_config(config),
            agent,
            schema,
            config.agent.recent_context,
        )
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn schema(&self) -> &Arc<DatabaseSchema> {
        &self.schema
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    /// Runs one exchange for `session_id` and returns the recorded entry.
    pub async fn handle(
        &self,
        session_id: &SessionId,
        question: &str,
    ) -> Result<ConversationEntry, QuerygateError> {
        let started = Instant::now();
        let mut session = self.registry.get_or_create(session_id).await?;
        let history = session.recent(self.recent_context);
        let mut entry = ConversationEntry::new(Utc::now(), question);

        let request = AgentRequest {
            question,
            schema: &self.schema,
            recent_history: &history,
        };
        let proposal = match self.agent.propose_sql(request).await {
            Ok(proposal) => proposal,
            Err(e) => {
                warn!(session_id = %session_id, agent = self.agent.name(), error = %e, "agent failed");
                entry.answer_text = "Sorry, I couldn't work out a query for that question.".into();
                entry.error_note = Some(e.to_string());
                return Ok(record(&mut session, entry, started));
            }
        };

        let Some(sql) = proposal.sql.filter(|sql| !sql.trim().is_empty()) else {
            debug!(session_id = %session_id, "agent answered without SQL");
            entry.answer_text = proposal.answer_hint;
            return Ok(record(&mut session, entry, started));
        };
        entry.generated_sql = Some(sql.clone());

        if let Authorization::Denied(denial) = self.guard.authorize(&sql) {
            entry.answer_text = format!("I can't run that query: {denial}.");
            entry.was_policy_denied = true;
            entry.denial = Some(denial);
            return Ok(record(&mut session, entry, started));
        }

        match self.executor.execute(&sql).await {
            Ok(result) => {
                entry.answer_text = self
                    .phrase_answer(question, &sql, &result, proposal.answer_hint)
                    .await;
                entry.result = Some(result);
            }
            Err(e) => {
                entry.answer_text = format!("The query could not be completed: {e}.");
                entry.error_note = Some(e.to_string());
            }
        }

        info!(
            session_id = %session_id,
            truncated = entry.was_truncated(),
            failed = entry.has_error(),
            "exchange completed"
        );
        Ok(record(&mut session, entry, started))
    }

    /// Lets the agent phrase the answer, falling back to its hint and then to a summary.
    async fn phrase_answer(
        &self,
        question: &str,
        sql: &str,
        result: &QueryResult,
        hint: String,
    ) -> String {
        match self.agent.compose_answer(question, sql, result).await {
            Ok(Some(answer)) if !answer.trim().is_empty() => return answer,
            Ok(_) => {}
            Err(e) => warn!(agent = self.agent.name(), error = %e, "answer composition failed"),
        }
        if !hint.trim().is_empty() {
            return hint;
        }
        summarize(result)
    }
}

/// Stamps `entry` with the completion time and appends it to the session.
fn record(
    session: &mut SessionHandle,
    mut entry: ConversationEntry,
    started: Instant,
) -> ConversationEntry {
    entry.timestamp = Utc::now();
    entry.execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    session.append_entry(entry.clone());
    entry
}

/// Plain summary of a result when nobody phrased one.
fn summarize(result: &QueryResult) -> String {
    if result.columns.is_empty() {
        return format!("{} row(s) affected.", result.rows_affected);
    }
    let mut text = format!("{} row(s) returned", result.row_count_returned);
    if result.row_count_truncated {
        text.push_str(" (truncated at the row limit)");
    }
    text.push('.');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(columns: &[&str], rows: usize, truncated: bool) -> QueryResult {
        QueryResult {
            sql: "SELECT 1".into(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: vec![Vec::new(); rows],
            row_count_returned: rows,
            row_count_truncated: truncated,
            rows_affected: 4,
            execution_duration_ms: 1,
        }
    }

    #[test]
    fn summary_mentions_truncation() {
        assert_eq!(summarize(&result(&["a"], 2, false)), "2 row(s) returned.");
        assert_eq!(
            summarize(&result(&["a"], 5, true)),
            "5 row(s) returned (truncated at the row limit)."
        );
        assert_eq!(summarize(&result(&[], 0, false)), "4 row(s) affected.");
    }
}
