// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy guard for agent-generated SQL.
//!
//! Every candidate statement passes through [`PolicyGuard::authorize`] before
//! it can reach the executor. Classification looks only at the leading
//! keyword of a single statement, with comments and quoted text stripped by
//! the [`lexer`].

pub mod classify;
pub mod lexer;
pub mod policy;

pub use classify::{analyze, classify, Analysis};
pub use policy::{classify_and_authorize, Authorization, PolicyGuard};
