//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which provider implementation to use
    #[serde(default)]
    pub provider: AiProviderKind,

    /// API key for the OpenAI-compatible endpoint
    pub openai_api_key: Option<String>,

    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum rate-limit retries per call
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Backoff between retried chat calls, seconds
    #[serde(default = "default_chat_backoff")]
    pub chat_backoff_secs: u64,

    /// Backoff between retried embedding calls, seconds
    #[serde(default = "default_embed_backoff")]
    pub embed_backoff_secs: u64,
}

/// Selectable provider implementations.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderKind {
    #[default]
    OpenAi,
    /// Canned-response provider for local development and tests.
    Mock,
}

impl AiConfig {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Chat retry backoff as a Duration
    pub fn chat_backoff(&self) -> Duration {
        Duration::from_secs(self.chat_backoff_secs)
    }

    /// Embedding retry backoff as a Duration
    pub fn embed_backoff(&self) -> Duration {
        Duration::from_secs(self.embed_backoff_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider == AiProviderKind::OpenAi && !self.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__OPENAI_API_KEY"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.chat_backoff_secs == 0 || self.embed_backoff_secs == 0 {
            return Err(ValidationError::InvalidBackoff);
        }
        if !self.base_url.starts_with("http") {
            return Err(ValidationError::InvalidBaseUrl("ai.base_url"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProviderKind::default(),
            openai_api_key: None,
            model: default_model(),
            embedding_model: default_embedding_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            chat_backoff_secs: default_chat_backoff(),
            embed_backoff_secs: default_embed_backoff(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_chat_backoff() -> u64 {
    2
}

fn default_embed_backoff() -> u64 {
    20
}
