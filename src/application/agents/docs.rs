//! Docs Agent - Answers how-to questions grounded in the knowledge base.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{Agent, AgentError, AgentResponse, ChatTurn};
use crate::application::gateway::LlmGateway;
use crate::application::retriever::KnowledgeRetriever;
use crate::domain::conversation::AgentType;
use crate::ports::{CompletionRequest, KnowledgeMatch};

const DOCS_SYSTEM_PROMPT: &str = "\
You are a documentation assistant for a freight shipping platform. Answer \
the customer's question using the provided knowledge-base excerpts. If the \
excerpts do not cover the question, say so plainly instead of guessing.";

/// Documentation agent backed by knowledge retrieval.
pub struct DocsAgent {
    gateway: Arc<LlmGateway>,
    retriever: Arc<KnowledgeRetriever>,
}

impl DocsAgent {
    pub fn new(gateway: Arc<LlmGateway>, retriever: Arc<KnowledgeRetriever>) -> Self {
        Self { gateway, retriever }
    }

    fn prompt_with_context(matches: &[KnowledgeMatch]) -> String {
        let mut prompt = String::from(DOCS_SYSTEM_PROMPT);
        if !matches.is_empty() {
            prompt.push_str("\n\nKnowledge-base excerpts:\n");
            for article in matches {
                prompt.push_str(&format!("\n## {}\n{}\n", article.title, article.content));
            }
        }
        prompt
    }
}

#[async_trait]
impl Agent for DocsAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Docs
    }

    async fn handle(&self, turn: &ChatTurn) -> Result<AgentResponse, AgentError> {
        let query = turn
            .conversation
            .latest_user_message()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let matches = self.retriever.search(&query).await?;
        debug!(matches = matches.len(), "docs retrieval completed");

        let request = CompletionRequest::new()
            .with_system_prompt(Self::prompt_with_context(&matches))
            .with_messages(turn.conversation.messages().to_vec());
        let content = self.gateway.complete(request).await?;

        let mut response = AgentResponse::text(content);
        // An empty retrieval answers without sources, it is not an error.
        if !matches.is_empty() {
            response = response.with_sources(matches);
        }
        Ok(response)
    }
}
