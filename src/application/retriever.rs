//! Knowledge Retriever - Embeds a query and finds similar articles.

use std::sync::Arc;

use tracing::debug;

use super::gateway::LlmGateway;
use crate::ports::{AiError, KnowledgeMatch, KnowledgeStore, KnowledgeStoreError};

/// Default minimum similarity for a match to be considered relevant.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;

/// Default maximum number of matches returned.
pub const DEFAULT_MATCH_LIMIT: usize = 5;

/// Retrieval errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] AiError),

    #[error("knowledge store failed: {0}")]
    Store(#[from] KnowledgeStoreError),
}

/// Retrieves knowledge-base articles similar to a query.
pub struct KnowledgeRetriever {
    gateway: Arc<LlmGateway>,
    store: Arc<dyn KnowledgeStore>,
    threshold: f64,
    limit: usize,
}

impl KnowledgeRetriever {
    /// Creates a retriever with the default threshold and limit.
    pub fn new(gateway: Arc<LlmGateway>, store: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            gateway,
            store,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            limit: DEFAULT_MATCH_LIMIT,
        }
    }

    /// Overrides the similarity threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Overrides the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Embeds the query and returns matches above the threshold, best first.
    ///
    /// An empty vector is a valid result, not an error.
    pub async fn search(&self, query: &str) -> Result<Vec<KnowledgeMatch>, RetrievalError> {
        let embedding = self.gateway.embed(query).await?;
        let matches = self
            .store
            .search(&embedding, self.threshold, self.limit)
            .await?;
        debug!(
            query_len = query.len(),
            matches = matches.len(),
            "knowledge search completed"
        );
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiProvider;
    use crate::adapters::knowledge::InMemoryKnowledgeStore;

    fn retriever_with(articles: Vec<(&str, Vec<f32>)>) -> KnowledgeRetriever {
        let provider = Arc::new(MockAiProvider::new().with_embedding(vec![1.0, 0.0]));
        let gateway = Arc::new(LlmGateway::new(provider));
        let mut store = InMemoryKnowledgeStore::new();
        for (title, embedding) in articles {
            store.insert(title, format!("https://kb.example/{title}"), "body", embedding);
        }
        KnowledgeRetriever::new(gateway, Arc::new(store))
    }

    #[tokio::test]
    async fn returns_matches_above_threshold_best_first() {
        let retriever = retriever_with(vec![
            ("exact", vec![1.0, 0.0]),
            ("close", vec![0.9, 0.1]),
            ("orthogonal", vec![0.0, 1.0]),
        ]);

        let matches = retriever.search("how do refunds work").await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].title, "exact");
        assert!(matches[0].similarity >= matches[1].similarity);
    }

    #[tokio::test]
    async fn empty_result_is_valid() {
        let retriever = retriever_with(vec![("orthogonal", vec![0.0, 1.0])]);
        let matches = retriever.search("unrelated").await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let retriever = retriever_with(vec![
            ("a", vec![1.0, 0.0]),
            ("b", vec![0.99, 0.01]),
            ("c", vec![0.98, 0.02]),
        ])
        .with_limit(2);

        let matches = retriever.search("query").await.unwrap();
        assert_eq!(matches.len(), 2);
    }
}
