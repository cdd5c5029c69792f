//! OpenAI Provider - OpenAI-compatible chat and embeddings client.
//!
//! Talks to any endpoint exposing the `/chat/completions` and `/embeddings`
//! API shape. Maps HTTP failures onto the provider error taxonomy; retry
//! policy lives in the gateway, not here.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::domain::conversation::MessageRole;
use crate::ports::{AiError, AiProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    api_key: Secret<String>,
    /// Chat model (e.g. "gpt-4o-mini").
    pub model: String,
    /// Embedding model (e.g. "text-embedding-3-small").
    pub embedding_model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a configuration with the given API key and default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible API provider.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    /// Creates a provider with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::InvalidRequest(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> WireChatRequest {
        let mut messages = Vec::new();
        if let Some(ref prompt) = request.system_prompt {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: prompt.clone(),
            });
        }
        for msg in &request.messages {
            messages.push(WireMessage {
                role: match msg.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                }
                .to_string(),
                content: msg.content.clone(),
            });
        }
        WireChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, AiError> {
        self.client
            .post(format!("{}{path}", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AiError::network(format!("connection failed: {e}"))
                } else {
                    AiError::network(e.to_string())
                }
            })
    }

    /// Maps non-success statuses onto the provider error taxonomy.
    async fn check_status(response: Response) -> Result<Response, AiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok());
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AiError::AuthenticationFailed),
            429 => Err(AiError::rate_limited(
                retry_after.or_else(|| parse_retry_hint(&body)),
            )),
            400..=499 => Err(AiError::InvalidRequest(body)),
            _ => Err(AiError::unavailable(format!("{status}: {body}"))),
        }
    }
}

/// Extracts a "try again in Ns" hint from an error body, when present.
fn parse_retry_hint(body: &str) -> Option<u32> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = parsed.get("error")?.get("message")?.as_str()?;
    let rest = &message[message.find("try again in ")? + "try again in ".len()..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AiError> {
        let wire = self.to_wire_request(&request);
        let response = self.post_json("/chat/completions", &wire).await?;
        let response = Self::check_status(response).await?;

        let parsed: WireChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::parse(e.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::parse("response contained no choices"))?;
        debug!(model = %parsed.model, "chat completion received");

        Ok(CompletionResponse {
            content: choice.message.content,
            model: parsed.model,
        })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        let wire = WireEmbeddingRequest {
            model: self.config.embedding_model.clone(),
            input: text.to_string(),
        };
        let response = self.post_json("/embeddings", &wire).await?;
        let response = Self::check_status(response).await?;

        let parsed: WireEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AiError::parse(e.to_string()))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AiError::parse("response contained no embedding"))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new(
            "openai",
            self.config.model.clone(),
            self.config.embedding_model.clone(),
        )
    }
}

#[derive(Debug, Serialize)]
struct WireChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireChatResponse {
    model: String,
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Serialize)]
struct WireEmbeddingRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct WireEmbeddingResponse {
    data: Vec<WireEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct WireEmbeddingData {
    embedding: Vec<f32>,
}
