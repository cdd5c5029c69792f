//! Knowledge Store Port - Vector similarity search over help articles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A knowledge-base article matched against a query embedding.
///
/// Ephemeral: produced per query and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMatch {
    pub title: String,
    pub url: String,
    pub content: String,
    /// Cosine similarity in [0, 1].
    pub similarity: f64,
}

/// Port for the external vector store.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Nearest neighbors of `embedding` with similarity >= `threshold`,
    /// ordered by descending similarity, at most `limit` results.
    ///
    /// An empty result is a valid answer, not an error.
    async fn search(
        &self,
        embedding: &[f32],
        threshold: f64,
        limit: usize,
    ) -> Result<Vec<KnowledgeMatch>, KnowledgeStoreError>;
}

/// Knowledge store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KnowledgeStoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}
