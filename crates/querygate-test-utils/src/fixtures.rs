// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk SQLite fixtures.

use std::path::{Path, PathBuf};

use querygate_core::QuerygateError;
use tempfile::TempDir;

/// A database file that lives as long as this value.
pub struct Fixture {
    pub path: PathBuf,
    _dir: TempDir,
}

impl Fixture {
    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

fn temp_path(name: &str) -> Result<(TempDir, PathBuf), QuerygateError> {
    let dir = TempDir::new().map_err(|e| QuerygateError::Storage { source: e.into() })?;
    let path = dir.path().join(name);
    Ok((dir, path))
}

/// The full sample database produced by `querygate seed`.
pub async fn sample_database() -> Result<Fixture, QuerygateError> {
    let (dir, path) = temp_path("sample.db")?;
    querygate_storage::seed_sample_database(&path).await?;
    Ok(Fixture { path, _dir: dir })
}

/// A single `products` table with `rows` rows.
pub fn products_table(rows: usize) -> Result<Fixture, QuerygateError> {
    let (dir, path) = temp_path("products.db")?;
    write_products(&path, rows).map_err(|e| QuerygateError::Storage { source: e.into() })?;
    Ok(Fixture { path, _dir: dir })
}

fn write_products(path: &Path, rows: usize) -> rusqlite::Result<()> {
    let mut conn = rusqlite::Connection::open(path)?;
    let tx = conn.transaction()?;
    tx.execute_batch(
        "CREATE TABLE products (product_id INTEGER PRIMARY KEY, product_name TEXT NOT NULL, price REAL);",
    )?;
    {
        let mut stmt = tx.prepare("INSERT INTO products (product_name, price) VALUES (?1, ?2)")?;
        for i in 0..rows {
            stmt.execute(rusqlite::params![format!("product {i}"), 10.0 + i as f64])?;
        }
    }
    tx.commit()
}
