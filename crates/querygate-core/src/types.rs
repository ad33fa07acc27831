// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the guard, executor, and session layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::PolicyDenial;

/// Opaque identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random session id.
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId(value)
    }
}

/// Kind of SQL statement as derived from its leading keyword.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    /// SELECT, WITH (read-only CTE), EXPLAIN.
    Read,
    /// INSERT, UPDATE, DELETE, REPLACE.
    Write,
    /// CREATE, ALTER, DROP, TRUNCATE.
    SchemaChange,
    /// Anything else. Always denied.
    Unknown,
}

impl StatementKind {
    /// Whether this kind mutates data or schema.
    pub fn is_destructive(self) -> bool {
        matches!(self, StatementKind::Write | StatementKind::SchemaChange)
    }
}

/// A single cell value read back from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Integer(v) => write!(f, "{v}"),
            CellValue::Real(v) => write!(f, "{v}"),
            CellValue::Text(v) => write!(f, "{v}"),
            CellValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

/// The capped result of one bounded execution.
///
/// Produced once by the executor and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// The statement that produced this result.
    pub sql: String,
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Row tuples, each aligned to `columns`.
    pub rows: Vec<Vec<CellValue>>,
    /// Number of rows in `rows`.
    pub row_count_returned: usize,
    /// True when more rows were available than the configured cap.
    pub row_count_truncated: bool,
    /// Rows changed by a statement that returns no columns.
    pub rows_affected: usize,
    /// End-to-end wall time including connection and prepare.
    pub execution_duration_ms: u64,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the result as a plain-text table, mostly for prompts and the REPL.
    pub fn to_text_table(&self) -> String {
        if self.columns.is_empty() {
            return format!("({} rows affected)", self.rows_affected);
        }
        let mut out = self.columns.join(" | ");
        for row in &self.rows {
            out.push('\n');
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            out.push_str(&cells.join(" | "));
        }
        if self.row_count_truncated {
            out.push_str(&format!(
                "\n... (truncated at {} rows)",
                self.row_count_returned
            ));
        }
        out
    }
}

/// One question/answer exchange recorded in a session's history.
///
/// Appended once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    /// SQL proposed by the agent, if it chose to query.
    pub generated_sql: Option<String>,
    /// Result of executing `generated_sql`, when it ran and succeeded.
    pub result: Option<QueryResult>,
    pub answer_text: String,
    pub was_policy_denied: bool,
    /// The denial reason when `was_policy_denied` is set.
    pub denial: Option<PolicyDenial>,
    /// Execution or agent failure, rendered for display.
    pub error_note: Option<String>,
    /// Wall-clock time of the whole exchange, agent calls included.
    #[serde(default)]
    pub execution_time_ms: u64,
}

impl ConversationEntry {
    /// Starts an entry for `question` stamped with `timestamp`.
    pub fn new(timestamp: DateTime<Utc>, question: impl Into<String>) -> Self {
        Self {
            timestamp,
            question: question.into(),
            generated_sql: None,
            result: None,
            answer_text: String::new(),
            was_policy_denied: false,
            denial: None,
            error_note: None,
            execution_time_ms: 0,
        }
    }

    /// True when the result was capped at the row limit.
    pub fn was_truncated(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|r| r.row_count_truncated)
    }

    /// True when the exchange ended in an execution or agent failure.
    pub fn has_error(&self) -> bool {
        self.error_note.is_some()
    }
}
