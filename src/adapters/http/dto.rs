//! Request DTOs for the chat endpoint.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::conversation::Message;
use crate::domain::foundation::ConversationId;

/// Body of `POST /chat`.
///
/// The server holds no conversation state; the client sends the full prior
/// history with every turn.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The new user message.
    pub message: String,
    /// Prior turns, oldest first. Assistant messages carry back the
    /// metadata they were delivered with.
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    /// Explicit target agent; omitted means "let the router decide".
    #[serde(default)]
    pub agent_type: Option<String>,
    /// Client-side conversation id; generated when absent.
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
    /// Customer identity, when the caller knows it.
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Echoed into the metadata stream event.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    /// Attach diagnostic logs to the response.
    #[serde(default)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageRole;

    #[test]
    fn minimal_request_deserializes_with_defaults() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"message": "hello"}"#).unwrap();

        assert_eq!(request.message, "hello");
        assert!(request.conversation_history.is_empty());
        assert!(request.agent_type.is_none());
        assert!(!request.debug);
    }

    #[test]
    fn full_request_deserializes() {
        let request: ChatRequest = serde_json::from_str(
            r#"{
                "message": "yes, book it",
                "conversation_history": [
                    {"role": "user", "content": "quote please"},
                    {"role": "assistant", "content": "Here is your estimate", "metadata": {"quote_state": "quote_presented"}}
                ],
                "agent_type": "quote",
                "customer_id": "cust-42",
                "metadata": {"session": "abc"},
                "debug": true
            }"#,
        )
        .unwrap();

        assert_eq!(request.conversation_history.len(), 2);
        assert_eq!(request.conversation_history[0].role, MessageRole::User);
        assert_eq!(request.agent_type.as_deref(), Some("quote"));
        assert_eq!(request.customer_id.as_deref(), Some("cust-42"));
        assert!(request.debug);
    }
}
