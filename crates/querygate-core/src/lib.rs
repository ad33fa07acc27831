// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Querygate SQL guardrail.
//!
//! Holds the error taxonomy, the data model shared by the guard, executor and
//! session layers, the read-only schema description, and the [`AgentAdapter`]
//! trait that SQL-generating agents implement.

pub mod error;
pub mod schema;
pub mod traits;
pub mod types;

pub use error::{ExecutionError, PolicyDenial, QuerygateError};
pub use schema::{ColumnInfo, DatabaseSchema, Relationship, TableInfo};
pub use traits::{AgentAdapter, AgentProposal, AgentRequest};
pub use types::{CellValue, ConversationEntry, QueryResult, SessionId, StatementKind};
