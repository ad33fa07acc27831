// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite access layer for Querygate.
//!
//! Every bounded execution opens its own `tokio-rusqlite` connection so a
//! slow or interrupted query never holds a handle another query needs.
//! Schema introspection and the sample-data seeder use the same
//! [`Database`] description.

pub mod database;
pub mod executor;
pub mod schema;
pub mod seed;

pub use database::Database;
pub use executor::{BoundedExecutor, ExecutionLimits};
pub use schema::load_schema;
pub use seed::{seed_sample_database, SeedSummary, EXAMPLE_QUESTIONS};
