// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation sessions and the guarded exchange pipeline.
//!
//! The [`SessionRegistry`] owns every [`ChatSession`]. The [`Gatekeeper`]
//! borrows one session per exchange, passes the agent's SQL through the
//! policy guard and the bounded executor, and records the outcome. The
//! sweeper task evicts idle sessions in the background.

pub mod exchange;
pub mod passthrough;
pub mod registry;
pub mod session;
pub mod shutdown;
pub mod sweeper;

pub use exchange::Gatekeeper;
pub use passthrough::PassthroughAgent;
pub use registry::{SessionHandle, SessionRegistry};
pub use session::{ChatSession, SessionSnapshot, SessionState};
pub use shutdown::install_signal_handler;
pub use sweeper::spawn_sweeper;
