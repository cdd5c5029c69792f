//! AI Provider Port - Interface for LLM provider integrations.
//!
//! Abstracts the chat-completion and embedding endpoints so the agents can
//! generate text and vectors without coupling to a specific provider. The
//! gateway layer adds rate-limit retry on top of this port; implementations
//! only classify errors.

use async_trait::async_trait;

use crate::domain::conversation::Message;

/// Port for AI/LLM provider interactions.
///
/// Implementations connect to an external AI service and translate between
/// the provider-specific API and our domain types. Each call carries its own
/// timeout; a blown timeout surfaces as [`AiError::Timeout`].
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generate a single chat completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AiError>;

    /// Embed a text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError>;

    /// Provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a chat completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Conversation messages (history + current user message).
    pub messages: Vec<Message>,
    /// System prompt to guide model behavior.
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Temperature for response randomness.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Replaces the message list.
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Response from a chat completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated content.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
}

/// Provider information.
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Provider name (e.g. "openai").
    pub name: String,
    /// Chat model identifier.
    pub model: String,
    /// Embedding model identifier.
    pub embedding_model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            embedding_model: embedding_model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AiError {
    /// Rate limited by the provider (HTTP 429 equivalent). The only error
    /// class the gateway retries.
    #[error("rate limited{}", retry_after_secs.map(|s| format!(": retry after {s}s")).unwrap_or_default())]
    RateLimited {
        /// Provider-supplied hint, when present.
        retry_after_secs: Option<u32>,
    },

    /// Request timed out. Not retried.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// Provider returned a 5xx. Not retried.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AiError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: Option<u32>) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// True only for the rate-limit class; everything else propagates
    /// immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AiError::RateLimited { .. })
    }
}
