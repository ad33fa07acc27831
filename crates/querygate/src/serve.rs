// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `querygate serve` command implementation.
//!
//! Serves the HTTP API with the idle sweeper running alongside, until
//! SIGTERM or Ctrl+C.

use querygate_agent::{install_signal_handler, spawn_sweeper};
use querygate_config::QuerygateConfig;
use querygate_core::QuerygateError;
use querygate_gateway::{start_server, GatewayState, ServerConfig};
use tracing::info;

use crate::pipeline::build_gatekeeper;

/// Runs the `querygate serve` command.
pub async fn run_serve(config: QuerygateConfig) -> Result<(), QuerygateError> {
    let gatekeeper = build_gatekeeper(&config).await?;
    let cancel = install_signal_handler();

    let sweeper = spawn_sweeper(
        gatekeeper.registry().clone(),
        config.sweep_interval(),
        cancel.clone(),
    );
    info!(
        interval_secs = config.session.sweep_interval_secs,
        idle_minutes = config.session.timeout_minutes,
        "session sweeper started"
    );

    let server_config = ServerConfig::from_config(&config);
    let served = start_server(&server_config, GatewayState::new(gatekeeper), cancel.clone()).await;

    // Stop the sweeper even when the server failed to start.
    cancel.cancel();
    let _ = sweeper.await;

    served?;
    info!("querygate serve shutdown complete");
    Ok(())
}
