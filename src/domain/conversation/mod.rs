//! Conversation module - Messages, history, and agent classification types.

mod agent_type;
mod message;

pub use agent_type::{AgentType, RoutingDecision};
pub use message::{Conversation, Message, MessageRole};
