// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `querygate schema` command implementation.

use colored::Colorize;
use querygate_config::QuerygateConfig;
use querygate_core::{QueryResult, QuerygateError, TableInfo};
use querygate_storage::{load_schema, BoundedExecutor, Database, ExecutionLimits, EXAMPLE_QUESTIONS};

const SAMPLE_ROWS: usize = 3;

/// Prints every table with its columns, row count and a few sample rows,
/// followed by the foreign keys and some example questions.
pub async fn run_schema(config: &QuerygateConfig) -> Result<(), QuerygateError> {
    let db = Database::new(&config.database.path, true);
    let schema = load_schema(&db).await?;
    let sampler = BoundedExecutor::new(
        db,
        ExecutionLimits {
            timeout: config.query_timeout(),
            max_rows: SAMPLE_ROWS,
            log_queries: false,
        },
    );

    println!("{}\n", "=== DATABASE STRUCTURE ===".bold());
    for table in &schema.tables {
        print_table(table);
        match sampler.execute(&sample_query(&table.name)).await {
            Ok(sample) => print_sample(&sample),
            Err(e) => println!("   {}", format!("sample unavailable: {e}").red()),
        }
        println!();
    }

    if !schema.relationships.is_empty() {
        println!("{}\n", "=== RELATIONSHIPS ===".bold());
        for rel in &schema.relationships {
            println!(
                "   {}.{} -> {}.{}",
                rel.from_table, rel.from_column, rel.to_table, rel.to_column
            );
        }
        println!();
    }

    println!("{}\n", "=== EXAMPLE QUESTIONS ===".bold());
    for (i, question) in EXAMPLE_QUESTIONS.iter().enumerate() {
        println!("{:2}. {question}", i + 1);
    }
    Ok(())
}

fn sample_query(table: &str) -> String {
    format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""))
}

fn print_table(table: &TableInfo) {
    println!("{} {}", "TABLE:".cyan(), table.name.to_uppercase().bold());
    println!("   Columns:");
    for column in &table.columns {
        let pk = if column.primary_key { " (PRIMARY KEY)" } else { "" };
        println!("   - {}: {}{pk}", column.name, column.data_type);
    }
    println!("   Records: {}", table.row_count);
}

fn print_sample(sample: &QueryResult) {
    if sample.is_empty() {
        return;
    }
    println!("   Sample data:");
    for (i, row) in sample.rows.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        println!("   {}. ({})", i + 1, cells.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_query_quotes_identifiers() {
        assert_eq!(sample_query("orders"), "SELECT * FROM \"orders\"");
        assert_eq!(sample_query("we\"ird"), "SELECT * FROM \"we\"\"ird\"");
    }

    #[tokio::test]
    async fn schema_command_runs_over_sample_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.db");
        querygate_storage::seed_sample_database(&path).await.unwrap();

        let mut config = QuerygateConfig::default();
        config.database.path = path.to_string_lossy().to_string();
        assert!(run_schema(&config).await.is_ok());
    }
}
