// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only database schema metadata.
//!
//! Produced by schema introspection and consumed by the policy guard (table
//! existence) and by agents (prompt context). Never mutated by the core.

use serde::{Deserialize, Serialize};

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type, as written in the DDL (may be empty in SQLite).
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    #[serde(default)]
    pub default_value: Option<String>,
}

/// A table and its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub row_count: u64,
}

impl TableInfo {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn primary_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// A foreign-key edge between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

/// Complete schema description of one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub tables: Vec<TableInfo>,
    pub relationships: Vec<Relationship>,
}

impl DatabaseSchema {
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Case-insensitive table lookup.
    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Compact textual description used as agent prompt context.
    ///
    /// One line per table: `name(col TYPE PK, col TYPE NOT NULL, ...)`, followed
    /// by one line per foreign key.
    pub fn describe(&self) -> String {
        let mut lines = Vec::with_capacity(self.tables.len() + self.relationships.len());
        for table in &self.tables {
            let cols: Vec<String> = table
                .columns
                .iter()
                .map(|c| {
                    let mut col = format!("{} {}", c.name, c.data_type).trim_end().to_string();
                    if c.primary_key {
                        col.push_str(" PK");
                    } else if !c.nullable {
                        col.push_str(" NOT NULL");
                    }
                    col
                })
                .collect();
            lines.push(format!("{}({})", table.name, cols.join(", ")));
        }
        for rel in &self.relationships {
            lines.push(format!(
                "{}.{} -> {}.{}",
                rel.from_table, rel.from_column, rel.to_table, rel.to_column
            ));
        }
        lines.join("\n")
    }
}
