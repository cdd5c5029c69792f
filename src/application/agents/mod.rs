//! Agents - Components that turn a conversation into a response.
//!
//! Every agent implements the same trait and is reached through the
//! dispatcher, which is the single entry point for all agent types.

mod dispatcher;
mod docs;
mod quote;
mod router;
mod shipments;
mod support;

pub use dispatcher::AgentDispatcher;
pub use docs::DocsAgent;
pub use quote::QuoteAgent;
pub use router::RouterAgent;
pub use shipments::ShipmentsAgent;
pub use support::SupportAgent;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::application::extractor::ExtractionError;
use crate::application::retriever::RetrievalError;
use crate::domain::conversation::{AgentType, Conversation};
use crate::domain::foundation::{ConversationId, CustomerId};
use crate::ports::{AiError, KnowledgeMatch, TicketingError};

/// One inbound chat turn: the reconstructed conversation plus request
/// context. The latest user message is already appended to the history.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub conversation_id: ConversationId,
    pub conversation: Conversation,
    pub customer_id: Option<CustomerId>,
    /// Caller-supplied metadata, echoed into the response metadata.
    pub metadata: Option<Map<String, Value>>,
    /// When set, agents attach diagnostic logs to the response.
    pub debug: bool,
}

impl ChatTurn {
    /// Creates a turn for the given conversation.
    pub fn new(conversation_id: ConversationId, conversation: Conversation) -> Self {
        Self {
            conversation_id,
            conversation,
            customer_id: None,
            metadata: None,
            debug: false,
        }
    }

    /// Sets the customer identity.
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Sets caller metadata.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Enables diagnostic logs.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// What an agent produced for one turn. Framed into stream events by the
/// SSE encoder.
#[derive(Debug, Clone, Default)]
pub struct AgentResponse {
    /// The reply text. Always present.
    pub content: String,
    /// Structured metadata (state, draft snapshot, routing reason).
    pub metadata: Option<Map<String, Value>>,
    /// Knowledge-base articles backing the answer.
    pub sources: Option<Vec<KnowledgeMatch>>,
    /// Diagnostic log lines, only when the request asked for them.
    pub debug_logs: Option<Vec<String>>,
}

impl AgentResponse {
    /// Creates a plain-text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attaches sources.
    pub fn with_sources(mut self, sources: Vec<KnowledgeMatch>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Attaches debug logs.
    pub fn with_debug_logs(mut self, logs: Vec<String>) -> Self {
        self.debug_logs = Some(logs);
        self
    }

    /// Merges extra keys into the response metadata.
    pub fn merge_metadata(&mut self, extra: Map<String, Value>) {
        match &mut self.metadata {
            Some(existing) => existing.extend(extra),
            None => self.metadata = Some(extra),
        }
    }
}

/// Errors an agent can surface. Each becomes a single `error` stream event.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("language model call failed: {0}")]
    Provider(#[from] AiError),

    #[error("knowledge retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("slot extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("ticket creation failed: {0}")]
    Ticketing(#[from] TicketingError),

    #[error("no agent registered for type '{0}'")]
    UnknownAgent(AgentType),
}

/// A component that turns a conversation into a response.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The type this agent is registered under.
    fn agent_type(&self) -> AgentType;

    /// Handles one turn.
    async fn handle(&self, turn: &ChatTurn) -> Result<AgentResponse, AgentError>;
}
