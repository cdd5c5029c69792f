//! Axum routes for the chat surface.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{chat, health, ChatAppState};

/// Routing table.
///
/// - `POST /chat` - one conversational turn, SSE response
/// - `GET /health` - liveness probe
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
}

/// Full router with tracing and CORS applied.
pub fn app_router(state: ChatAppState) -> Router {
    chat_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
