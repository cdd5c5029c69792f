//! Router Agent - Classifies a turn into a target agent type.
//!
//! One LLM call over the latest user message. Routing must never hard-fail
//! a conversation: unparseable output, an unknown agent name, a missing
//! user message, or even a failed provider call all fall back to the
//! default agent with a recorded reason.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Agent, AgentError, AgentResponse, ChatTurn};
use crate::application::extractor::strip_code_fences;
use crate::application::gateway::LlmGateway;
use crate::domain::conversation::{AgentType, Conversation, Message, RoutingDecision};
use crate::ports::CompletionRequest;

/// Agent used when classification cannot produce a confident answer.
pub const FALLBACK_AGENT: AgentType = AgentType::Support;

const ROUTER_SYSTEM_PROMPT: &str = "\
You route customer messages for a shipping platform to the right assistant. \
Valid assistants: \
\"quote\" (price estimates and shipping quotes), \
\"docs\" (how-to and documentation questions), \
\"support\" (account, billing, login and general issues), \
\"shipments\" (tracking and status of existing shipments). \
Reply with a single JSON object {\"agent\": \"...\", \"reason\": \"...\"} \
and nothing else.";

#[derive(Debug, Deserialize)]
struct RawDecision {
    agent: String,
    #[serde(default)]
    reason: String,
}

/// Classifies conversations into agent types.
pub struct RouterAgent {
    gateway: Arc<LlmGateway>,
}

impl RouterAgent {
    /// Creates a router over the given gateway.
    pub fn new(gateway: Arc<LlmGateway>) -> Self {
        Self { gateway }
    }

    /// Classifies the latest user turn. Infallible by design; failures
    /// degrade to [`FALLBACK_AGENT`] with a reason containing "fallback".
    pub async fn route(&self, conversation: &Conversation) -> RoutingDecision {
        let Some(latest) = conversation.latest_user_message() else {
            return RoutingDecision::new(FALLBACK_AGENT, "fallback: no user message");
        };

        let request = CompletionRequest::new()
            .with_system_prompt(ROUTER_SYSTEM_PROMPT)
            .with_temperature(0.0)
            .with_max_tokens(200)
            .with_message(Message::user(latest.content.clone()));

        let raw = match self.gateway.complete(request).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "router llm call failed, using fallback agent");
                return RoutingDecision::new(
                    FALLBACK_AGENT,
                    format!("fallback: classification call failed ({err})"),
                );
            }
        };

        match Self::parse_decision(&raw) {
            Some(decision) => {
                debug!(agent = %decision.agent, "routing decision");
                decision
            }
            None => {
                warn!(raw, "router output unparseable, using fallback agent");
                RoutingDecision::new(FALLBACK_AGENT, "fallback: unparseable routing output")
            }
        }
    }

    fn parse_decision(raw: &str) -> Option<RoutingDecision> {
        let parsed: RawDecision = serde_json::from_str(strip_code_fences(raw)).ok()?;
        let agent: AgentType = parsed.agent.parse().ok()?;
        // The router must hand off to a concrete agent, never to itself.
        if !AgentType::routable().contains(&agent) {
            return None;
        }
        let reason = if parsed.reason.is_empty() {
            "classified by router".to_string()
        } else {
            parsed.reason
        };
        Some(RoutingDecision::new(agent, reason))
    }
}

#[async_trait]
impl Agent for RouterAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Router
    }

    /// Direct invocation returns the classification itself; the dispatcher
    /// normally consumes the decision instead of exposing it.
    async fn handle(&self, turn: &ChatTurn) -> Result<AgentResponse, AgentError> {
        let decision = self.route(&turn.conversation).await;
        let mut metadata = Map::new();
        metadata.insert("agent".into(), Value::from(decision.agent.as_str()));
        metadata.insert("routing_reason".into(), Value::from(decision.reason.clone()));
        Ok(AgentResponse::text(format!(
            "Routed to the {} agent: {}",
            decision.agent, decision.reason
        ))
        .with_metadata(metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAiProvider, MockError};

    fn router_with(response: &str) -> RouterAgent {
        RouterAgent::new(Arc::new(LlmGateway::new(Arc::new(
            MockAiProvider::new().with_response(response),
        ))))
    }

    fn convo(text: &str) -> Conversation {
        Conversation::from_messages(vec![Message::user(text)])
    }

    #[tokio::test]
    async fn routes_support_question_to_support() {
        let router = router_with(
            r#"{"agent": "support", "reason": "account access problem"}"#,
        );

        let decision = router.route(&convo("I can't log into my account")).await;

        assert_eq!(decision.agent, AgentType::Support);
        assert_eq!(decision.reason, "account access problem");
    }

    #[tokio::test]
    async fn routes_quote_request_to_quote() {
        let router = router_with(r#"{"agent": "quote", "reason": "asking for a price"}"#);
        let decision = router.route(&convo("how much to ship a pallet?")).await;
        assert_eq!(decision.agent, AgentType::Quote);
    }

    #[tokio::test]
    async fn malformed_output_falls_back_to_support() {
        let router = router_with("I think this is probably a quote question?");

        let decision = router.route(&convo("ship a pallet")).await;

        assert_eq!(decision.agent, AgentType::Support);
        assert!(decision.reason.contains("fallback"));
    }

    #[tokio::test]
    async fn unknown_agent_name_falls_back_to_support() {
        let router = router_with(r#"{"agent": "billing", "reason": "invoice question"}"#);

        let decision = router.route(&convo("where is my invoice?")).await;

        assert_eq!(decision.agent, AgentType::Support);
        assert!(decision.reason.contains("fallback"));
    }

    #[tokio::test]
    async fn router_classifying_to_itself_is_rejected() {
        let router = router_with(r#"{"agent": "router", "reason": "loop"}"#);
        let decision = router.route(&convo("hello")).await;
        assert_eq!(decision.agent, AgentType::Support);
    }

    #[tokio::test]
    async fn empty_conversation_falls_back_with_reason() {
        let router = router_with(r#"{"agent": "quote", "reason": "unused"}"#);

        let decision = router.route(&Conversation::new()).await;

        assert_eq!(decision.agent, AgentType::Support);
        assert!(decision.reason.contains("no user message"));
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_fallback() {
        let router = RouterAgent::new(Arc::new(LlmGateway::new(Arc::new(
            MockAiProvider::new().with_error(MockError::Unavailable {
                message: "503".into(),
            }),
        ))));

        let decision = router.route(&convo("hello")).await;

        assert_eq!(decision.agent, AgentType::Support);
        assert!(decision.reason.contains("fallback"));
    }

    #[tokio::test]
    async fn accepts_fenced_json() {
        let router = router_with("```json\n{\"agent\": \"docs\", \"reason\": \"how-to\"}\n```");
        let decision = router.route(&convo("how do I print labels?")).await;
        assert_eq!(decision.agent, AgentType::Docs);
    }
}
