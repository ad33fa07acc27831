// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use querygate_core::{
    ConversationEntry, DatabaseSchema, PolicyDenial, QueryResult, QuerygateError, SessionId,
};
use querygate_storage::EXAMPLE_QUESTIONS;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::server::GatewayState;

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The natural-language question.
    pub prompt: String,
    /// Continue this session; a new one is created when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for POST /v1/chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
    pub sql_query: Option<String>,
    /// Seconds spent on the whole exchange.
    pub execution_time: f64,
    /// False when the query was denied or failed.
    pub success: bool,
    pub denied: bool,
    pub denial: Option<PolicyDenial>,
    pub truncated: bool,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryResult>,
}

impl ChatResponse {
    fn from_entry(session_id: &SessionId, entry: ConversationEntry, elapsed_secs: f64) -> Self {
        let truncated = entry.was_truncated();
        Self {
            session_id: session_id.to_string(),
            success: !entry.was_policy_denied && entry.error_note.is_none(),
            response: entry.answer_text,
            sql_query: entry.generated_sql,
            execution_time: elapsed_secs,
            denied: entry.was_policy_denied,
            denial: entry.denial,
            truncated,
            error: entry.error_note,
            result: entry.result,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub agent: String,
    pub live_sessions: usize,
}

/// Response body for GET /v1/sessions.
#[derive(Debug, Serialize)]
pub struct SessionCountResponse {
    pub active_sessions: usize,
}

/// Response body for GET /v1/schema.
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub tables: Vec<String>,
    /// Compact one-line-per-table description.
    pub schema_info: String,
    pub total_tables: usize,
    pub details: DatabaseSchema,
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<EndpointInfo>,
    pub example_queries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub path: &'static str,
    pub description: &'static str,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// GET /
pub async fn get_root() -> Json<ApiInfoResponse> {
    let endpoints = vec![
        EndpointInfo {
            path: "POST /v1/chat",
            description: "Ask a question about the database",
        },
        EndpointInfo {
            path: "GET /v1/schema",
            description: "Database schema information",
        },
        EndpointInfo {
            path: "GET /v1/sessions",
            description: "Number of live sessions",
        },
        EndpointInfo {
            path: "GET /v1/sessions/{id}",
            description: "History of a session",
        },
        EndpointInfo {
            path: "DELETE /v1/sessions/{id}",
            description: "End a session",
        },
        EndpointInfo {
            path: "GET /health",
            description: "Health status",
        },
    ];
    Json(ApiInfoResponse {
        message: "Querygate SQL chat API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
        example_queries: EXAMPLE_QUESTIONS.iter().map(|q| (*q).to_string()).collect(),
    })
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        agent: state.gatekeeper.agent_name().to_string(),
        live_sessions: state.gatekeeper.registry().len(),
    })
}

/// POST /v1/chat
///
/// Runs one exchange. Denied and failed queries are still 200 responses with
/// `success: false`; an expired session is 410 Gone.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "prompt cannot be empty");
    }

    let session_id = body
        .session_id
        .filter(|id| !id.trim().is_empty())
        .map(SessionId::from)
        .unwrap_or_else(SessionId::generate);

    let started = Instant::now();
    match state.gatekeeper.handle(&session_id, prompt).await {
        Ok(entry) => {
            let response =
                ChatResponse::from_entry(&session_id, entry, started.elapsed().as_secs_f64());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e @ QuerygateError::SessionExpired { .. }) => {
            info!(session_id = %session_id, "chat on expired session");
            error_response(StatusCode::GONE, e.to_string())
        }
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "chat failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /v1/sessions
pub async fn get_sessions(State(state): State<GatewayState>) -> Json<SessionCountResponse> {
    Json(SessionCountResponse {
        active_sessions: state.gatekeeper.registry().len(),
    })
}

/// GET /v1/sessions/{id}
///
/// The session's history as a snapshot. Reading does not count as activity.
pub async fn get_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match state
        .gatekeeper
        .registry()
        .snapshot(&SessionId::from(id.as_str()))
        .await
    {
        Ok(Some(snapshot)) => Json(snapshot).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("no live session `{id}`")),
        Err(e) => error_response(StatusCode::GONE, e.to_string()),
    }
}

/// DELETE /v1/sessions/{id}
pub async fn delete_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    if state.gatekeeper.registry().destroy(&SessionId::from(id.as_str())) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, format!("no live session `{id}`"))
    }
}

/// GET /v1/schema
pub async fn get_schema(State(state): State<GatewayState>) -> Json<SchemaResponse> {
    let schema = state.gatekeeper.schema();
    Json(SchemaResponse {
        tables: schema.table_names().into_iter().map(String::from).collect(),
        schema_info: schema.describe(),
        total_tables: schema.tables.len(),
        details: schema.as_ref().clone(),
    })
}
