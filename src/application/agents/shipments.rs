//! Shipments Agent - Questions about existing shipments.
//!
//! No tracking-store integration yet; the agent explains what it can and
//! points the customer at the right self-service surface.

use async_trait::async_trait;
use std::sync::Arc;

use super::{Agent, AgentError, AgentResponse, ChatTurn};
use crate::application::gateway::LlmGateway;
use crate::domain::conversation::AgentType;
use crate::ports::CompletionRequest;

const SHIPMENTS_SYSTEM_PROMPT: &str = "\
You are a shipments assistant for a freight shipping platform. Help \
customers with questions about shipments already booked: tracking, pickup \
windows, delays and delivery. You do not have live tracking data; when the \
customer asks for the current location of a shipment, explain how to look it \
up with their ticket number on the tracking page.";

/// Agent for questions about already-booked shipments.
pub struct ShipmentsAgent {
    gateway: Arc<LlmGateway>,
}

impl ShipmentsAgent {
    pub fn new(gateway: Arc<LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Agent for ShipmentsAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Shipments
    }

    async fn handle(&self, turn: &ChatTurn) -> Result<AgentResponse, AgentError> {
        let request = CompletionRequest::new()
            .with_system_prompt(SHIPMENTS_SYSTEM_PROMPT)
            .with_messages(turn.conversation.messages().to_vec());
        let content = self.gateway.complete(request).await?;
        Ok(AgentResponse::text(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use crate::domain::conversation::{Conversation, Message};
    use crate::domain::foundation::ConversationId;

    #[tokio::test]
    async fn returns_completion_content() {
        let agent = ShipmentsAgent::new(Arc::new(LlmGateway::new(Arc::new(
            MockAiProvider::new().with_response("Check the tracking page with your ticket."),
        ))));

        let turn = ChatTurn::new(
            ConversationId::new(),
            Conversation::from_messages(vec![Message::user("where is my shipment?")]),
        );
        let response = agent.handle(&turn).await.unwrap();

        assert_eq!(
            response.content,
            "Check the tracking page with your ticket."
        );
    }
}
