// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database location and connection flags.
//!
//! A [`Database`] is a cheap description, not an open handle. Callers get a
//! fresh `tokio-rusqlite` connection per unit of work.

use std::path::{Path, PathBuf};

use querygate_config::QuerygateConfig;
use querygate_core::QuerygateError;
use rusqlite::OpenFlags;

/// Convert a tokio-rusqlite error into QuerygateError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> QuerygateError {
    QuerygateError::Storage {
        source: Box::new(e),
    }
}

/// The target SQLite file and how to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    path: PathBuf,
    read_only: bool,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>, read_only: bool) -> Self {
        Self {
            path: path.into(),
            read_only,
        }
    }

    /// Read-only unless destructive queries are allowed.
    pub fn from_config(config: &QuerygateConfig) -> Self {
        Self::new(
            &config.database.path,
            !config.database.allow_destructive_queries,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Flags for opening an existing database. The file is never created here.
    pub fn open_flags(&self) -> OpenFlags {
        let access = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }

    /// Open a new connection to the database file.
    pub async fn connect(&self) -> Result<tokio_rusqlite::Connection, QuerygateError> {
        tokio_rusqlite::Connection::open_with_flags(&self.path, self.open_flags())
            .await
            .map_err(|e| QuerygateError::Storage {
                source: Box::new(e),
            })
    }
}
