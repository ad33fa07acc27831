// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema introspection via `sqlite_master` and table PRAGMAs.

use querygate_core::{ColumnInfo, DatabaseSchema, QuerygateError, Relationship, TableInfo};
use tracing::debug;

use crate::database::{map_tr_err, Database};

/// Load tables, columns, row counts, and foreign keys of `db`.
pub async fn load_schema(db: &Database) -> Result<DatabaseSchema, QuerygateError> {
    let conn = db.connect().await?;
    let schema = conn
        .call(|conn| {
            let mut names_stmt = conn.prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )?;
            let names = names_stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;

            let mut tables = Vec::with_capacity(names.len());
            let mut relationships = Vec::new();
            for name in names {
                let quoted = quote_ident(&name);

                let mut cols_stmt = conn.prepare(&format!("PRAGMA table_info({quoted})"))?;
                let columns = cols_stmt
                    .query_map([], |row| {
                        Ok(ColumnInfo {
                            name: row.get(1)?,
                            data_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                            nullable: row.get::<_, i64>(3)? == 0,
                            default_value: row.get(4)?,
                            primary_key: row.get::<_, i64>(5)? > 0,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let row_count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {quoted}"), [], |row| row.get(0))?;

                let mut fk_stmt = conn.prepare(&format!("PRAGMA foreign_key_list({quoted})"))?;
                let edges = fk_stmt
                    .query_map([], |row| {
                        Ok(Relationship {
                            from_table: name.clone(),
                            to_table: row.get(2)?,
                            from_column: row.get(3)?,
                            to_column: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                relationships.extend(edges);

                tables.push(TableInfo {
                    name,
                    columns,
                    row_count: u64::try_from(row_count).unwrap_or(0),
                });
            }

            Ok(DatabaseSchema {
                tables,
                relationships,
            })
        })
        .await
        .map_err(map_tr_err)?;

    debug!(
        tables = schema.tables.len(),
        relationships = schema.relationships.len(),
        "schema loaded"
    );
    Ok(schema)
}

/// Double-quote an identifier for interpolation into PRAGMA or SELECT text.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[tokio::test]
    async fn introspects_columns_counts_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE authors (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             CREATE TABLE books (
                 id INTEGER PRIMARY KEY,
                 author_id INTEGER REFERENCES authors (id),
                 title TEXT,
                 status TEXT DEFAULT 'draft'
             );
             INSERT INTO authors (name) VALUES ('a'), ('b');",
        )
        .unwrap();
        drop(conn);

        let schema = load_schema(&Database::new(&path, true)).await.unwrap();
        assert_eq!(schema.table_names(), vec!["authors", "books"]);

        let authors = schema.table("AUTHORS").unwrap();
        assert_eq!(authors.row_count, 2);
        assert_eq!(authors.primary_keys(), vec!["id"]);
        assert!(!authors.columns[1].nullable);

        let books = schema.table("books").unwrap();
        let status = books.columns.iter().find(|c| c.name == "status").unwrap();
        assert_eq!(status.default_value.as_deref(), Some("'draft'"));

        assert_eq!(
            schema.relationships,
            vec![Relationship {
                from_table: "books".into(),
                from_column: "author_id".into(),
                to_table: "authors".into(),
                to_column: "id".into(),
            }]
        );
    }
}
