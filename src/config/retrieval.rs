//! Knowledge retrieval configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Knowledge retrieval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum cosine similarity for a match
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,

    /// Maximum matches returned per query
    #[serde(default = "default_limit")]
    pub match_limit: usize,
}

impl RetrievalConfig {
    /// Validate retrieval configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ValidationError::InvalidSimilarityThreshold);
        }
        if self.match_limit == 0 {
            return Err(ValidationError::InvalidMatchLimit);
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_threshold(),
            match_limit: default_limit(),
        }
    }
}

fn default_threshold() -> f64 {
    0.5
}

fn default_limit() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RetrievalConfig::default();
        assert_eq!(config.similarity_threshold, 0.5);
        assert_eq!(config.match_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let config = RetrievalConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let config = RetrievalConfig {
            match_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
