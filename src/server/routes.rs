//! HTTP route handlers for the relay API.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::relay::errors::RelayError;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/reply", post(get_reply))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "relay-agent",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Inbound message request.
#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    /// Raw message text.
    pub message: String,
    /// Caller identifier (phone number).
    pub caller_id: String,
}

/// Agent reply response.
#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    /// Generated reply text.
    pub text: String,
}

/// Handle an inbound caller message.
async fn get_reply(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReplyRequest>,
) -> Result<Json<ReplyResponse>, (StatusCode, String)> {
    let reply = state
        .engine
        .get_reply(&request.message, &request.caller_id)
        .await
        .map_err(|err| (error_status(&err), format!("Relay error: {err}")))?;

    Ok(Json(ReplyResponse { text: reply.text }))
}

/// Map relay errors to HTTP statuses.
fn error_status(err: &RelayError) -> StatusCode {
    match err {
        RelayError::UpstreamStatus { .. }
        | RelayError::HttpRequest(_)
        | RelayError::EmptyCompletion => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
