//! HTTP/SSE adapter - the axum surface over the agent dispatcher.

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod sse;

pub use handlers::ChatAppState;
pub use routes::app_router;
pub use sse::{decode_stream, encode_event, events_for, StreamEvent};
