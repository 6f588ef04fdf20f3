//! Chat HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/chat              - Welcome message
//! - POST   /api/chat              - Send a message, get the grounded reply
//! - GET    /api/chat/sessions     - Every active session with its history
//! - GET    /api/chat/{sessionId}  - History of one session, oldest first
//! - DELETE /api/chat/{sessionId}  - Clear a session (204)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use newsbot_types::chat::{SessionHistory, SessionId, Turn};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for `POST /api/chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Parse a session id, returning a 400 error on anything but a hyphenated UUID.
fn parse_session_id(raw: &str) -> Result<SessionId, AppError> {
    raw.parse::<SessionId>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// GET /api/chat - Static greeting, wrapped as `{"message": "..."}` so every
/// success body on this route is a JSON object.
pub async fn welcome(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: state.orchestrator.welcome_message().to_string(),
    })
}

/// POST /api/chat - Run one message through the pipeline.
pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let session_id = request
        .session_id
        .as_deref()
        .ok_or_else(|| AppError::Validation("sessionId is required".to_string()))
        .and_then(parse_session_id)?;
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Validation("message must be a non-empty string".to_string()))?;

    let reply = state.orchestrator.send_message(&session_id, &message).await?;
    Ok(Json(SendMessageResponse { reply }))
}

/// GET /api/chat/sessions - All active sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionHistory>>, AppError> {
    Ok(Json(state.orchestrator.all_sessions().await?))
}

/// GET /api/chat/{sessionId} - One session's turns. Unknown sessions yield `[]`.
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Turn>>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    Ok(Json(state.orchestrator.history(&session_id).await?))
}

/// DELETE /api/chat/{sessionId} - Clear a session. Idempotent.
pub async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session_id = parse_session_id(&session_id)?;
    state.orchestrator.clear_history(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
