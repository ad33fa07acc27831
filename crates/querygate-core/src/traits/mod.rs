// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for external collaborators.

pub mod agent;

pub use agent::{AgentAdapter, AgentProposal, AgentRequest};
