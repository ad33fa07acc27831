// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded execution of authorized statements.
//!
//! A statement runs under a wall-clock deadline and a row cap. When the
//! deadline passes, the statement is interrupted on the SQLite worker thread
//! and the caller gets [`ExecutionError::Timeout`] with no partial rows.
//! Rows beyond the cap are not read; the result is marked truncated instead.

use std::time::{Duration, Instant};

use querygate_config::QuerygateConfig;
use querygate_core::{CellValue, ExecutionError, QueryResult};
use rusqlite::types::ValueRef;
use tokio::time::timeout_at;
use tracing::{info, warn};

use crate::database::Database;

/// Deadline, row cap, and logging switch for one executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub timeout: Duration,
    pub max_rows: usize,
    pub log_queries: bool,
}

impl ExecutionLimits {
    pub fn from_config(config: &QuerygateConfig) -> Self {
        Self {
            timeout: config.query_timeout(),
            max_rows: config.database.max_result_rows,
            log_queries: config.database.enable_query_logging,
        }
    }
}

/// Rows read on the worker thread, before timing is attached.
struct Fetched {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    truncated: bool,
    rows_affected: usize,
}

/// Runs statements the policy guard has already allowed.
#[derive(Debug, Clone)]
pub struct BoundedExecutor {
    db: Database,
    limits: ExecutionLimits,
}

impl BoundedExecutor {
    pub fn new(db: Database, limits: ExecutionLimits) -> Self {
        Self { db, limits }
    }

    pub fn from_config(config: &QuerygateConfig) -> Self {
        Self::new(Database::from_config(config), ExecutionLimits::from_config(config))
    }

    pub fn limits(&self) -> ExecutionLimits {
        self.limits
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Execute `sql` under the configured deadline and row cap.
    ///
    /// The duration covers connection, prepare, and row reading.
    pub async fn execute(&self, sql: &str) -> Result<QueryResult, ExecutionError> {
        let started = Instant::now();
        let outcome = self.run(sql).await;
        let elapsed = started.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(fetched) => {
                let result = QueryResult {
                    sql: sql.to_string(),
                    columns: fetched.columns,
                    row_count_returned: fetched.rows.len(),
                    rows: fetched.rows,
                    row_count_truncated: fetched.truncated,
                    rows_affected: fetched.rows_affected,
                    execution_duration_ms: duration_ms,
                };
                if self.limits.log_queries {
                    info!(
                        target: "querygate::query",
                        sql,
                        duration_ms,
                        rows = result.row_count_returned,
                        truncated = result.row_count_truncated,
                        rows_affected = result.rows_affected,
                        "query executed"
                    );
                }
                Ok(result)
            }
            Err(err) => {
                if self.limits.log_queries {
                    warn!(target: "querygate::query", sql, duration_ms, error = %err, "query failed");
                }
                Err(err)
            }
        }
    }

    async fn run(&self, sql: &str) -> Result<Fetched, ExecutionError> {
        let deadline = deadline_after(self.limits.timeout);
        let timed_out = || ExecutionError::Timeout {
            duration: self.limits.timeout,
        };

        let conn = timeout_at(
            deadline,
            tokio_rusqlite::Connection::open_with_flags(self.db.path(), self.db.open_flags()),
        )
        .await
        .map_err(|_| timed_out())?
        .map_err(backend)?;

        let interrupt = timeout_at(
            deadline,
            conn.call(|c| Ok::<_, rusqlite::Error>(c.get_interrupt_handle())),
        )
        .await
        .map_err(|_| timed_out())?
        .map_err(backend)?;

        let owned_sql = sql.to_string();
        let max_rows = self.limits.max_rows;
        match timeout_at(deadline, conn.call(move |c| fetch(c, &owned_sql, max_rows))).await {
            Ok(result) => result.map_err(backend),
            Err(_) => {
                interrupt.interrupt();
                Err(timed_out())
            }
        }
    }
}

/// Roughly thirty years; stands in for deadlines the clock cannot represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(timeout: Duration) -> tokio::time::Instant {
    let now = tokio::time::Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + FAR_FUTURE)
}

fn backend(e: impl std::fmt::Display) -> ExecutionError {
    ExecutionError::Backend {
        message: e.to_string(),
    }
}

/// Runs on the SQLite worker thread.
fn fetch(
    conn: &mut rusqlite::Connection,
    sql: &str,
    max_rows: usize,
) -> Result<Fetched, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    if columns.is_empty() {
        let affected = stmt.execute([])?;
        return Ok(Fetched {
            columns,
            rows: Vec::new(),
            truncated: false,
            rows_affected: affected,
        });
    }

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    let mut truncated = false;
    while let Some(row) = rows.next()? {
        if out.len() == max_rows {
            truncated = true;
            break;
        }
        let mut values = Vec::with_capacity(columns.len());
        for idx in 0..columns.len() {
            values.push(cell(row.get_ref(idx)?));
        }
        out.push(values);
    }

    Ok(Fetched {
        columns,
        rows: out,
        truncated,
        rows_affected: 0,
    })
}

fn cell(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Real(f),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
    }
}
