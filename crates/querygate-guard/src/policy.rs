// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Allow/deny decisions for classified statements.

use std::sync::Arc;

use querygate_config::QuerygateConfig;
use querygate_core::{DatabaseSchema, PolicyDenial, StatementKind};
use tracing::{info, warn};

use crate::classify::analyze;

/// Outcome of authorizing one SQL submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// The statement may run.
    Allowed {
        kind: StatementKind,
        /// Referenced tables missing from the attached schema. Advisory only.
        unknown_tables: Vec<String>,
    },
    /// The statement must not run.
    Denied(PolicyDenial),
}

impl Authorization {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Authorization::Allowed { .. })
    }

    /// The statement kind if allowed.
    pub fn kind(&self) -> Option<StatementKind> {
        match self {
            Authorization::Allowed { kind, .. } => Some(*kind),
            Authorization::Denied(_) => None,
        }
    }

    pub fn denial(&self) -> Option<&PolicyDenial> {
        match self {
            Authorization::Denied(denial) => Some(denial),
            Authorization::Allowed { .. } => None,
        }
    }

    /// Converts into a `Result`, dropping the advisory table list.
    pub fn into_result(self) -> Result<StatementKind, PolicyDenial> {
        match self {
            Authorization::Allowed { kind, .. } => Ok(kind),
            Authorization::Denied(denial) => Err(denial),
        }
    }
}

/// Decides whether a candidate statement may execute.
///
/// Pure: never touches the database. An attached [`DatabaseSchema`] is used
/// only to flag table names it does not contain.
#[derive(Debug, Clone, Default)]
pub struct PolicyGuard {
    allow_destructive: bool,
    schema: Option<Arc<DatabaseSchema>>,
}

impl PolicyGuard {
    pub fn new(allow_destructive: bool) -> Self {
        Self {
            allow_destructive,
            schema: None,
        }
    }

    pub fn from_config(config: &QuerygateConfig) -> Self {
        Self::new(config.database.allow_destructive_queries)
    }

    /// Attach a schema for unknown-table reporting.
    pub fn with_schema(mut self, schema: Arc<DatabaseSchema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn allow_destructive(&self) -> bool {
        self.allow_destructive
    }

    /// Classify `sql` and decide.
    ///
    /// Multiple statements are rejected before anything else, whatever the
    /// destructive setting. Empty or unrecognized input is denied. WRITE and
    /// SCHEMA_CHANGE need `allow_destructive`.
    pub fn authorize(&self, sql: &str) -> Authorization {
        let analysis = analyze(sql);

        let denial = if analysis.statement_count > 1 {
            Some(PolicyDenial::MultiStatementRejected)
        } else {
            match analysis.kind {
                StatementKind::Unknown => Some(PolicyDenial::UnrecognizedStatement),
                kind if kind.is_destructive() && !self.allow_destructive => {
                    Some(PolicyDenial::DestructiveQueryBlocked { kind })
                }
                _ => None,
            }
        };

        if let Some(denial) = denial {
            info!(
                kind = %analysis.kind,
                statements = analysis.statement_count,
                reason = %denial,
                "statement denied"
            );
            return Authorization::Denied(denial);
        }

        let unknown_tables: Vec<String> = match &self.schema {
            Some(schema) => analysis
                .table_refs
                .into_iter()
                .filter(|name| !schema.has_table(name))
                .collect(),
            None => Vec::new(),
        };
        if !unknown_tables.is_empty() {
            warn!(tables = ?unknown_tables, "statement references tables not in the schema");
        }

        Authorization::Allowed {
            kind: analysis.kind,
            unknown_tables,
        }
    }
}

/// One-shot classification and decision under `config`.
pub fn classify_and_authorize(sql: &str, config: &QuerygateConfig) -> Authorization {
    PolicyGuard::from_config(config).authorize(sql)
}
