//! LLM Gateway - Uniform call interface with bounded rate-limit retry.
//!
//! Wraps an [`AiProvider`] and retries only the rate-limit error class, with
//! a fixed backoff per call kind (embeddings wait longer than chat). Every
//! other error propagates immediately; timeouts are enforced by the provider
//! adapter and are non-retryable. The gateway holds no cache and no state
//! beyond its configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::ports::{AiError, AiProvider, CompletionRequest};

/// Retry configuration for the gateway.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retries after the initial attempt.
    pub max_retries: u32,
    /// Fixed backoff between chat completion retries.
    pub chat_backoff: Duration,
    /// Fixed backoff between embedding retries.
    pub embed_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            chat_backoff: Duration::from_secs(2),
            embed_backoff: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt. A provider-supplied retry-after hint
    /// is honored but capped at the configured backoff so a hostile header
    /// cannot stall a worker.
    fn delay(&self, ceiling: Duration, error: &AiError) -> Duration {
        match error {
            AiError::RateLimited {
                retry_after_secs: Some(secs),
            } => Duration::from_secs(u64::from(*secs)).min(ceiling),
            _ => ceiling,
        }
    }
}

/// Gateway over the AI provider with bounded retry.
pub struct LlmGateway {
    provider: Arc<dyn AiProvider>,
    policy: RetryPolicy,
}

impl LlmGateway {
    /// Creates a gateway with the default retry policy.
    pub fn new(provider: Arc<dyn AiProvider>) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
        }
    }

    /// Creates a gateway with a custom retry policy.
    pub fn with_policy(provider: Arc<dyn AiProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Generates a chat completion, retrying rate limits up to the
    /// configured maximum. Returns the completion text.
    pub async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
        let mut attempt = 0u32;
        loop {
            match self.provider.complete(request.clone()).await {
                Ok(response) => return Ok(response.content),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay(self.policy.chat_backoff, &err);
                    warn!(
                        attempt,
                        max = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "chat completion rate limited, retrying"
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Embeds text into a vector, retrying rate limits up to the configured
    /// maximum.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        let mut attempt = 0u32;
        loop {
            match self.provider.embed(text).await {
                Ok(vector) => return Ok(vector),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay(self.policy.embed_backoff, &err);
                    warn!(
                        attempt,
                        max = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "embedding rate limited, retrying"
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
