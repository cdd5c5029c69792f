//! Support Agent - General assistance, and the routing fallback target.

use async_trait::async_trait;
use std::sync::Arc;

use super::{Agent, AgentError, AgentResponse, ChatTurn};
use crate::application::gateway::LlmGateway;
use crate::domain::conversation::AgentType;
use crate::ports::CompletionRequest;

const SUPPORT_SYSTEM_PROMPT: &str = "\
You are a customer support assistant for a freight shipping platform. Help \
with account, billing, login and general questions. Be concise and concrete. \
If the customer is actually asking for a shipping quote, tell them you can \
start one for them.";

/// General support agent. Also the fallback when routing is inconclusive.
pub struct SupportAgent {
    gateway: Arc<LlmGateway>,
}

impl SupportAgent {
    pub fn new(gateway: Arc<LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Agent for SupportAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Support
    }

    async fn handle(&self, turn: &ChatTurn) -> Result<AgentResponse, AgentError> {
        let request = CompletionRequest::new()
            .with_system_prompt(SUPPORT_SYSTEM_PROMPT)
            .with_messages(turn.conversation.messages().to_vec());
        let content = self.gateway.complete(request).await?;
        Ok(AgentResponse::text(content))
    }
}
