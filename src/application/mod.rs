//! Application layer - Orchestration over domain types and ports.

pub mod agents;
pub mod extractor;
pub mod gateway;
pub mod retriever;

pub use agents::{
    Agent, AgentDispatcher, AgentError, AgentResponse, ChatTurn, DocsAgent, QuoteAgent,
    RouterAgent, ShipmentsAgent, SupportAgent,
};
pub use extractor::{LlmSlotExtractor, RuleSlotExtractor, SlotExtractor};
pub use gateway::{LlmGateway, RetryPolicy};
pub use retriever::KnowledgeRetriever;
