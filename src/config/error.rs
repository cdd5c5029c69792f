//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Similarity threshold must be within [0, 1]")]
    InvalidSimilarityThreshold,

    #[error("Match limit must be at least 1")]
    InvalidMatchLimit,

    #[error("Retry backoff must be at least 1 second")]
    InvalidBackoff,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(&'static str),
}
