//! HTTP handlers for the chat surface.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::stream;
use serde_json::json;
use tracing::error;

use super::dto::ChatRequest;
use super::sse::{encode_event, events_for, StreamEvent};
use crate::application::agents::{AgentDispatcher, ChatTurn};
use crate::domain::conversation::{AgentType, Conversation, Message};
use crate::domain::foundation::{ConversationId, CustomerId};

/// Application state for the chat endpoints.
#[derive(Clone)]
pub struct ChatAppState {
    pub dispatcher: Arc<AgentDispatcher>,
}

/// Handles `POST /chat`.
///
/// Request validation failures are plain JSON 400s; anything after dispatch
/// starts is delivered in-stream, errors included, with a 200 status.
pub async fn chat(
    State(state): State<ChatAppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    // An explicit agent type must name a dispatchable agent. Rejected
    // before any LLM call.
    let explicit = match request.agent_type.as_deref() {
        Some(raw) => match raw.parse::<AgentType>() {
            Ok(agent) if AgentType::routable().contains(&agent) => Some(agent),
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("unknown agent type '{raw}'") })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "message must not be empty" })),
        )
            .into_response();
    }

    let mut conversation = Conversation::from_messages(request.conversation_history);
    conversation.push(Message::user(request.message));

    let conversation_id = request.conversation_id.unwrap_or_default();
    let mut turn = ChatTurn::new(conversation_id, conversation).with_debug(request.debug);
    if let Some(customer_id) = request.customer_id.and_then(CustomerId::new) {
        turn = turn.with_customer(customer_id);
    }
    if let Some(metadata) = request.metadata {
        turn = turn.with_metadata(metadata);
    }

    let events = match state.dispatcher.dispatch(&turn, explicit).await {
        Ok(response) => events_for(response),
        Err(err) => {
            error!(conversation_id = %conversation_id, error = %err, "chat turn failed");
            vec![StreamEvent::Error {
                message: err.to_string(),
            }]
        }
    };

    stream_response(events)
}

/// Frames events as an SSE response body.
fn stream_response(events: Vec<StreamEvent>) -> Response {
    let frames = events
        .iter()
        .map(|event| Ok::<_, Infallible>(Bytes::from(encode_event(event))))
        .collect::<Vec<_>>();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(stream::iter(frames)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Handles `GET /health`.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use crate::adapters::http::sse::decode_stream;
    use crate::application::agents::{RouterAgent, SupportAgent};
    use crate::application::gateway::LlmGateway;
    use axum::body::to_bytes;

    fn state(router_output: &str, support_output: &str) -> ChatAppState {
        let router_gateway = Arc::new(LlmGateway::new(Arc::new(
            MockAiProvider::new().with_response(router_output),
        )));
        let support_gateway = Arc::new(LlmGateway::new(Arc::new(
            MockAiProvider::new().with_response(support_output),
        )));
        ChatAppState {
            dispatcher: Arc::new(AgentDispatcher::new(
                Arc::new(RouterAgent::new(router_gateway)),
                vec![Arc::new(SupportAgent::new(support_gateway))],
            )),
        }
    }

    fn request(body: &str) -> ChatRequest {
        serde_json::from_str(body).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn streams_chunk_then_metadata() {
        let state = state(
            r#"{"agent": "support", "reason": "general"}"#,
            "Happy to help.",
        );

        let response = chat(
            State(state),
            Json(request(r#"{"message": "I need help"}"#)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let events = decode_stream(&body_text(response).await).unwrap();
        assert!(
            matches!(&events[0], StreamEvent::Chunk { content } if content == "Happy to help.")
        );
        assert!(matches!(&events[1], StreamEvent::Metadata { metadata }
            if metadata["agent"] == "support"));
    }

    #[tokio::test]
    async fn unknown_agent_type_is_400_before_any_llm_call() {
        let provider = Arc::new(MockAiProvider::new());
        let gateway = Arc::new(LlmGateway::new(provider.clone()));
        let state = ChatAppState {
            dispatcher: Arc::new(AgentDispatcher::new(
                Arc::new(RouterAgent::new(gateway.clone())),
                vec![Arc::new(SupportAgent::new(gateway))],
            )),
        };

        let response = chat(
            State(state),
            Json(request(
                r#"{"message": "hello", "agent_type": "billing"}"#,
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(provider.complete_calls(), 0);
    }

    #[tokio::test]
    async fn router_is_not_a_valid_explicit_target() {
        let state = state(r#"{"agent": "support", "reason": "x"}"#, "hi");

        let response = chat(
            State(state),
            Json(request(r#"{"message": "hello", "agent_type": "router"}"#)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let state = state(r#"{"agent": "support", "reason": "x"}"#, "hi");

        let response = chat(
            State(state),
            Json(request(r#"{"message": "   "}"#)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dispatch_failure_becomes_an_error_event_with_200() {
        // Quote agent is not registered, so an explicit quote turn fails.
        let state = state(r#"{"agent": "support", "reason": "x"}"#, "hi");

        let response = chat(
            State(state),
            Json(request(r#"{"message": "quote please", "agent_type": "quote"}"#)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let events = decode_stream(&body_text(response).await).unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StreamEvent::Error { .. }));
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
