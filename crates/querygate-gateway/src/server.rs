// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use querygate_agent::Gatekeeper;
use querygate_config::QuerygateConfig;
use querygate_core::QuerygateError;
use tokio_util::sync::CancellationToken;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Requests processed at once; the rest wait.
const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub gatekeeper: Arc<Gatekeeper>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(gatekeeper: Arc<Gatekeeper>) -> Self {
        Self {
            gatekeeper,
            start_time: Instant::now(),
        }
    }
}

/// Gateway bind address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_config(config: &QuerygateConfig) -> Self {
        Self {
            host: config.gateway.host.clone(),
            port: config.gateway.port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builds the gateway router:
/// - GET / and GET /health
/// - POST /v1/chat
/// - GET /v1/sessions, GET and DELETE /v1/sessions/{id}
/// - GET /v1/schema
pub fn router(state: GatewayState) -> Router {
    let api_routes = Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/sessions", get(handlers::get_sessions))
        .route(
            "/v1/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/v1/schema", get(handlers::get_schema))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    Router::new()
        .route("/", get(handlers::get_root))
        .route("/health", get(handlers::get_health))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the gateway until `cancel` fires, then drains in-flight requests.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), QuerygateError> {
    let app = router(state);
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| QuerygateError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| QuerygateError::Internal(format!("gateway server error: {e}")))?;

    info!("Gateway server stopped");
    Ok(())
}
