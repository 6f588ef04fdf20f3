//! Application error type mapping to HTTP status codes.
//!
//! Error bodies have the shape `{"error": {"code": "...", "message": "..."}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use newsbot_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the chat pipeline.
    Chat(ChatError),
    /// Malformed request (bad JSON, invalid session id, blank message).
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Chat(ChatError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Chat(e @ ChatError::EmbeddingUnavailable(_)) => {
                (StatusCode::BAD_GATEWAY, "EMBEDDING_UNAVAILABLE", e.to_string())
            }
            AppError::Chat(e @ ChatError::SearchUnavailable(_)) => {
                (StatusCode::BAD_GATEWAY, "SEARCH_UNAVAILABLE", e.to_string())
            }
            AppError::Chat(e @ ChatError::GenerationUnavailable(_)) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_UNAVAILABLE", e.to_string())
            }
            AppError::Chat(e @ ChatError::StoreUnavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        } else {
            tracing::debug!(code, error = %message, "request rejected");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
