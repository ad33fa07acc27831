// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Querygate workspace.
//!
//! Each failure family is its own enum so callers can match on the outcome
//! they care about. [`QuerygateError`] wraps them for propagation across
//! crate boundaries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::StatementKind;

/// Why the policy guard refused to let a statement run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PolicyDenial {
    /// A WRITE or SCHEMA_CHANGE statement while destructive queries are disabled.
    #[error("{kind} statements are blocked because destructive queries are disabled")]
    DestructiveQueryBlocked { kind: StatementKind },

    /// Empty text or a leading keyword the guard does not recognize.
    #[error("statement was not recognized as a permitted SQL command")]
    UnrecognizedStatement,

    /// More than one statement was submitted at once.
    #[error("multiple SQL statements in one submission are not allowed")]
    MultiStatementRejected,
}

/// A failure while running an authorized statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The deadline elapsed; the statement was interrupted.
    #[error("query exceeded the {}s time limit and was cancelled", duration.as_secs_f64())]
    Timeout { duration: Duration },

    /// The database reported an error (syntax, constraint, runtime).
    #[error("database error: {message}")]
    Backend { message: String },
}

/// The primary error type used across Querygate crates.
#[derive(Debug, Error)]
pub enum QuerygateError {
    /// Configuration was invalid at a point where it is consumed at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// The policy guard declined the statement.
    #[error("query declined: {0}")]
    Policy(#[from] PolicyDenial),

    /// The bounded executor failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The session expired or was destroyed; a new session id is required.
    #[error("session `{session_id}` has expired; start a new session")]
    SessionExpired { session_id: String },

    /// The SQL-generating agent failed.
    #[error("agent error: {message}")]
    Agent {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage-level failures outside a bounded execution (open, introspection, seeding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuerygateError {
    /// Shorthand for an agent error without an underlying source.
    pub fn agent(message: impl Into<String>) -> Self {
        QuerygateError::Agent {
            message: message.into(),
            source: None,
        }
    }
}
