// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background idle-session sweeper.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::registry::SessionRegistry;

/// Spawns a task that calls [`SessionRegistry::sweep_expired`] every
/// `interval` until `cancel` fires.
pub fn spawn_sweeper(
    registry: Arc<SessionRegistry>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("session sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    registry.sweep_expired(chrono::Utc::now());
                }
            }
        }
    })
}
