//! Axum router configuration with middleware.
//!
//! Chat routes live under `/api/chat`; `/health` sits at the root.
//! Middleware: CORS, tracing.

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let chat_routes = Router::new()
        .route(
            "/",
            get(handlers::chat::welcome).post(handlers::chat::send_message),
        )
        .route("/sessions", get(handlers::chat::list_sessions))
        .route(
            "/{session_id}",
            get(handlers::chat::get_history).delete(handlers::chat::clear_history),
        );

    Router::new()
        .nest("/api/chat", chat_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness probe.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
