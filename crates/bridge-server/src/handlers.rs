//! HTTP Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use bridge_core::{BridgeError, ResultContent, ToolDescriptor, Turn};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub messages: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ToolCallResponse {
    pub result: Vec<ResultContent>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tools: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn map_error(err: &BridgeError) -> HandlerError {
    let (status, code) = match err {
        BridgeError::NotConnected => (StatusCode::SERVICE_UNAVAILABLE, "NOT_CONNECTED"),
        BridgeError::ToolExecution { .. } => (StatusCode::BAD_GATEWAY, "TOOL_ERROR"),
        BridgeError::LlmInvocation(_) => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
        BridgeError::MalformedResponse(_) => (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE"),
        BridgeError::RoundLimit(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ROUND_LIMIT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    };
    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code,
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.lock().await;
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tools: session.catalog().len(),
    })
}

/// Resolve one query and return the transcript accumulated along the way
pub async fn process_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, HandlerError> {
    let mut session = state.session.lock().await;
    let messages = session.process_query(&payload.query).await.map_err(|err| {
        tracing::error!(error = %err, "query failed");
        map_error(&err)
    })?;

    Ok(Json(QueryResponse { messages }))
}

/// The tool catalog cached at connection time
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    let session = state.session.lock().await;
    Json(ToolsResponse {
        tools: session.catalog().to_vec(),
    })
}

/// Invoke one tool directly, bypassing the LLM
pub async fn call_tool(
    State(state): State<AppState>,
    Json(payload): Json<ToolCallRequest>,
) -> Result<Json<ToolCallResponse>, HandlerError> {
    let session = state.session.lock().await;
    let result = session
        .call_tool(&payload.name, payload.args)
        .await
        .map_err(|err| {
            tracing::warn!(tool = %payload.name, error = %err, "direct tool call failed");
            map_error(&err)
        })?;

    Ok(Json(ToolCallResponse { result }))
}
