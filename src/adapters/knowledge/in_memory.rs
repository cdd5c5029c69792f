//! In-memory knowledge store with brute-force cosine search.
//!
//! Backs tests and small deployments where the article set fits in memory.

use async_trait::async_trait;

use crate::ports::{KnowledgeMatch, KnowledgeStore, KnowledgeStoreError};

struct Article {
    title: String,
    url: String,
    content: String,
    embedding: Vec<f32>,
}

/// Knowledge store over an in-memory article list.
#[derive(Default)]
pub struct InMemoryKnowledgeStore {
    articles: Vec<Article>,
}

impl InMemoryKnowledgeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an article with its precomputed embedding.
    pub fn insert(
        &mut self,
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        embedding: Vec<f32>,
    ) {
        self.articles.push(Article {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            embedding,
        });
    }

    /// Number of stored articles.
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// True when the store holds no articles.
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

/// Cosine similarity of two vectors; zero for mismatched dimensions or a
/// zero-magnitude side.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn search(
        &self,
        embedding: &[f32],
        threshold: f64,
        limit: usize,
    ) -> Result<Vec<KnowledgeMatch>, KnowledgeStoreError> {
        if embedding.is_empty() {
            return Err(KnowledgeStoreError::InvalidQuery(
                "empty query embedding".to_string(),
            ));
        }

        let mut matches: Vec<KnowledgeMatch> = self
            .articles
            .iter()
            .filter_map(|article| {
                let similarity = cosine_similarity(embedding, &article.embedding);
                (similarity >= threshold).then(|| KnowledgeMatch {
                    title: article.title.clone(),
                    url: article.url.clone(),
                    content: article.content.clone(),
                    similarity,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryKnowledgeStore {
        let mut store = InMemoryKnowledgeStore::new();
        store.insert("exact", "https://kb/exact", "a", vec![1.0, 0.0]);
        store.insert("close", "https://kb/close", "b", vec![0.9, 0.1]);
        store.insert("orthogonal", "https://kb/orth", "c", vec![0.0, 1.0]);
        store
    }

    #[tokio::test]
    async fn filters_by_threshold_and_sorts_descending() {
        let matches = store().search(&[1.0, 0.0], 0.5, 10).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].title, "exact");
        assert!((matches[0].similarity - 1.0).abs() < 1e-9);
        assert!(matches[0].similarity >= matches[1].similarity);
    }

    #[tokio::test]
    async fn limit_truncates_results() {
        let matches = store().search(&[1.0, 0.0], 0.0, 1).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].title, "exact");
    }

    #[tokio::test]
    async fn empty_embedding_is_an_invalid_query() {
        let err = store().search(&[], 0.5, 10).await.unwrap_err();
        assert!(matches!(err, KnowledgeStoreError::InvalidQuery(_)));
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
    }
}
