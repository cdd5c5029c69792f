//! AgentType enum keying agent dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The specialized agents a conversation turn can be handled by.
///
/// Dispatch is keyed by this value. Unknown tokens are a hard error at the
/// request boundary; only the router's own LLM-output parsing is allowed to
/// fall back (see `RouterAgent`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Meta-agent that classifies a turn into one of the others.
    Router,
    /// Slot-filling shipping quote agent.
    Quote,
    /// Knowledge-base documentation agent.
    Docs,
    /// General account/support agent.
    Support,
    /// Shipment tracking agent.
    Shipments,
}

impl AgentType {
    /// All agent types, dispatchable ones first.
    pub fn all() -> &'static [AgentType] {
        &[
            AgentType::Quote,
            AgentType::Docs,
            AgentType::Support,
            AgentType::Shipments,
            AgentType::Router,
        ]
    }

    /// Agent types the router may classify a turn into.
    ///
    /// The router never routes to itself.
    pub fn routable() -> &'static [AgentType] {
        &[
            AgentType::Quote,
            AgentType::Docs,
            AgentType::Support,
            AgentType::Shipments,
        ]
    }

    /// Wire token for this agent type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::Router => "router",
            AgentType::Quote => "quote",
            AgentType::Docs => "docs",
            AgentType::Support => "support",
            AgentType::Shipments => "shipments",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "router" => Ok(AgentType::Router),
            "quote" => Ok(AgentType::Quote),
            "docs" => Ok(AgentType::Docs),
            "support" => Ok(AgentType::Support),
            "shipments" => Ok(AgentType::Shipments),
            other => Err(ValidationError::invalid_format(
                "agent_type",
                format!("unknown agent type '{other}'"),
            )),
        }
    }
}

/// Output of the router agent for a single turn. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// The agent the turn should be handled by.
    pub agent: AgentType,
    /// Why the router chose it (or why it fell back).
    pub reason: String,
}

impl RoutingDecision {
    /// Creates a routing decision.
    pub fn new(agent: AgentType, reason: impl Into<String>) -> Self {
        Self {
            agent,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tokens_case_insensitively() {
        assert_eq!("quote".parse::<AgentType>().unwrap(), AgentType::Quote);
        assert_eq!("SUPPORT".parse::<AgentType>().unwrap(), AgentType::Support);
        assert_eq!(" docs ".parse::<AgentType>().unwrap(), AgentType::Docs);
    }

    #[test]
    fn rejects_unknown_token() {
        assert!("billing".parse::<AgentType>().is_err());
        assert!("".parse::<AgentType>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for agent in AgentType::all() {
            assert_eq!(agent.to_string().parse::<AgentType>().unwrap(), *agent);
        }
    }

    #[test]
    fn router_is_not_routable() {
        assert!(!AgentType::routable().contains(&AgentType::Router));
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AgentType::Shipments).unwrap(),
            "\"shipments\""
        );
    }
}
