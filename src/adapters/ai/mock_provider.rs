//! Mock AI Provider for testing.
//!
//! Configurable to return canned completions and embeddings or inject
//! errors, with call tracking for verification. Completion and embedding
//! responses are independent queues consumed in order; an exhausted queue
//! falls back to a default success.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{
    AiError, AiProvider, CompletionRequest, CompletionResponse, ProviderInfo,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAiProvider {
    completions: Arc<Mutex<VecDeque<Result<String, MockError>>>>,
    embeddings: Arc<Mutex<VecDeque<Result<Vec<f32>, MockError>>>>,
    complete_requests: Arc<Mutex<Vec<CompletionRequest>>>,
    embed_requests: Arc<Mutex<Vec<String>>>,
}

/// Errors the mock can inject.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after: Option<u32> },
    Unavailable { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AiError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after } => AiError::rate_limited(retry_after),
            MockError::Unavailable { message } => AiError::unavailable(message),
            MockError::Timeout { timeout_secs } => AiError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAiProvider {
    /// Creates a mock with empty response queues.
    pub fn new() -> Self {
        Self {
            completions: Arc::new(Mutex::new(VecDeque::new())),
            embeddings: Arc::new(Mutex::new(VecDeque::new())),
            complete_requests: Arc::new(Mutex::new(Vec::new())),
            embed_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful completion.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.completions
            .lock()
            .unwrap()
            .push_back(Ok(content.into()));
        self
    }

    /// Queues a completion error.
    pub fn with_error(self, error: MockError) -> Self {
        self.completions.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queues a successful embedding.
    pub fn with_embedding(self, embedding: Vec<f32>) -> Self {
        self.embeddings.lock().unwrap().push_back(Ok(embedding));
        self
    }

    /// Queues an embedding error.
    pub fn with_embed_error(self, error: MockError) -> Self {
        self.embeddings.lock().unwrap().push_back(Err(error));
        self
    }

    /// Number of completion calls made.
    pub fn complete_calls(&self) -> usize {
        self.complete_requests.lock().unwrap().len()
    }

    /// Number of embedding calls made.
    pub fn embed_calls(&self) -> usize {
        self.embed_requests.lock().unwrap().len()
    }

    /// All recorded completion requests.
    pub fn recorded_completions(&self) -> Vec<CompletionRequest> {
        self.complete_requests.lock().unwrap().clone()
    }

    /// All recorded embedding inputs.
    pub fn recorded_embeds(&self) -> Vec<String> {
        self.embed_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AiError> {
        self.complete_requests.lock().unwrap().push(request);

        let next = self
            .completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Mock response".to_string()));
        match next {
            Ok(content) => Ok(CompletionResponse {
                content,
                model: "mock-chat-1".to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        self.embed_requests.lock().unwrap().push(text.to_string());

        let next = self
            .embeddings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![0.0; 8]));
        match next {
            Ok(embedding) => Ok(embedding),
            Err(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-chat-1", "mock-embed-1")
    }
}
