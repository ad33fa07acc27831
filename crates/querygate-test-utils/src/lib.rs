// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Querygate integration tests.
//!
//! Provides a scripted agent and a harness that wires the whole exchange
//! pipeline over a seeded temporary SQLite database, so tests run without
//! network access or an LLM key.
//!
//! # Components
//!
//! - [`MockAgent`] - agent with queued proposals and recorded requests
//! - [`TestHarness`] - gatekeeper, registry, and seeded database in a temp dir
//! - [`fixtures`] - small on-disk databases for storage-level tests

pub mod fixtures;
pub mod harness;
pub mod mock_agent;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_agent::{MockAgent, SeenRequest};
