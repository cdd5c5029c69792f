//! Agent Dispatcher - Single entry point from the HTTP layer to the agents.
//!
//! Holds the typed registry built once at startup. Requests with an explicit
//! agent type skip classification; everything else goes through the router
//! first, in the same request.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use super::{Agent, AgentError, AgentResponse, ChatTurn, RouterAgent};
use crate::domain::conversation::AgentType;

/// Routes each turn to the agent that should handle it.
pub struct AgentDispatcher {
    router: Arc<RouterAgent>,
    agents: HashMap<AgentType, Arc<dyn Agent>>,
}

impl AgentDispatcher {
    /// Builds the registry. Every agent registers under its own type.
    pub fn new(router: Arc<RouterAgent>, agents: Vec<Arc<dyn Agent>>) -> Self {
        let agents = agents
            .into_iter()
            .map(|agent| (agent.agent_type(), agent))
            .collect();
        Self { router, agents }
    }

    /// Looks up the agent registered for a type.
    pub fn resolve(&self, agent_type: AgentType) -> Result<&Arc<dyn Agent>, AgentError> {
        self.agents
            .get(&agent_type)
            .ok_or(AgentError::UnknownAgent(agent_type))
    }

    /// Handles one turn. `explicit` bypasses the router; otherwise the
    /// router's decision picks the agent and its reason lands in the
    /// response metadata.
    pub async fn dispatch(
        &self,
        turn: &ChatTurn,
        explicit: Option<AgentType>,
    ) -> Result<AgentResponse, AgentError> {
        let (agent_type, routing_reason) = match explicit {
            Some(agent_type) => (agent_type, None),
            None => {
                let decision = self.router.route(&turn.conversation).await;
                (decision.agent, Some(decision.reason))
            }
        };
        info!(agent = %agent_type, routed = routing_reason.is_some(), "dispatching turn");

        let agent = self.resolve(agent_type)?;
        let mut response = agent.handle(turn).await?;

        // Caller metadata is echoed back; server-set keys win on conflict.
        let mut server_keys = Map::new();
        server_keys.insert("agent".into(), Value::from(agent_type.as_str()));
        if let Some(reason) = routing_reason {
            server_keys.insert("routing_reason".into(), Value::from(reason));
        }
        if let Some(caller) = &turn.metadata {
            let mut merged = caller.clone();
            if let Some(existing) = response.metadata.take() {
                merged.extend(existing);
            }
            response.metadata = Some(merged);
        }
        response.merge_metadata(server_keys);

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use crate::application::agents::SupportAgent;
    use crate::application::gateway::LlmGateway;
    use crate::domain::conversation::{Conversation, Message};
    use crate::domain::foundation::ConversationId;

    fn dispatcher(router_output: &str) -> AgentDispatcher {
        let router_gateway = Arc::new(LlmGateway::new(Arc::new(
            MockAiProvider::new().with_response(router_output),
        )));
        let agent_gateway = Arc::new(LlmGateway::new(Arc::new(
            MockAiProvider::new().with_response("support says hi"),
        )));
        AgentDispatcher::new(
            Arc::new(RouterAgent::new(router_gateway)),
            vec![Arc::new(SupportAgent::new(agent_gateway))],
        )
    }

    fn turn(text: &str) -> ChatTurn {
        ChatTurn::new(
            ConversationId::new(),
            Conversation::from_messages(vec![Message::user(text)]),
        )
    }

    #[tokio::test]
    async fn routes_when_no_explicit_agent_and_records_reason() {
        let dispatcher = dispatcher(r#"{"agent": "support", "reason": "login issue"}"#);

        let response = dispatcher
            .dispatch(&turn("I can't log into my account"), None)
            .await
            .unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["agent"], "support");
        assert_eq!(metadata["routing_reason"], "login issue");
        assert_eq!(response.content, "support says hi");
    }

    #[tokio::test]
    async fn explicit_agent_skips_the_router() {
        // Router output would send this elsewhere if consulted.
        let dispatcher = dispatcher(r#"{"agent": "docs", "reason": "unused"}"#);

        let response = dispatcher
            .dispatch(&turn("hello"), Some(AgentType::Support))
            .await
            .unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["agent"], "support");
        assert!(!metadata.contains_key("routing_reason"));
    }

    #[tokio::test]
    async fn unregistered_agent_type_is_rejected() {
        let dispatcher = dispatcher(r#"{"agent": "quote", "reason": "price"}"#);

        let err = dispatcher
            .dispatch(&turn("quote please"), Some(AgentType::Quote))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::UnknownAgent(AgentType::Quote)));
    }

    #[tokio::test]
    async fn malformed_router_output_still_succeeds_via_fallback() {
        let dispatcher = dispatcher("no json here");

        let response = dispatcher.dispatch(&turn("ship a pallet"), None).await.unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["agent"], "support");
        assert!(metadata["routing_reason"]
            .as_str()
            .unwrap()
            .contains("fallback"));
    }

    #[tokio::test]
    async fn caller_metadata_is_echoed_without_clobbering_server_keys() {
        let dispatcher = dispatcher(r#"{"agent": "support", "reason": "misc"}"#);

        let mut caller = Map::new();
        caller.insert("session".into(), Value::from("abc-123"));
        caller.insert("agent".into(), Value::from("spoofed"));
        let turn = turn("hello").with_metadata(caller);

        let response = dispatcher.dispatch(&turn, None).await.unwrap();

        let metadata = response.metadata.unwrap();
        assert_eq!(metadata["session"], "abc-123");
        assert_eq!(metadata["agent"], "support");
    }
}
