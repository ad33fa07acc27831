// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Querygate exchange pipeline.
//!
//! Exposes the [`Gatekeeper`](querygate_agent::Gatekeeper) over a small JSON
//! API: chat, session logout, session count, schema, and health.

pub mod handlers;
pub mod server;

pub use server::{router, start_server, GatewayState, ServerConfig};
