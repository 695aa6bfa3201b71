use thiserror::Error;

use crate::embedding::EmbeddingError;

/// Failure categories of the recommendation path.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Malformed or missing input: short title, unknown location, bad filter.
    #[error("{0}")]
    Validation(String),

    /// No benchmark job cleared the similarity floor.
    #[error("{0}")]
    NotFound(String),

    /// Matches exist but none carry usable market salary data.
    #[error("{0}")]
    NoSalaryData(String),

    /// The request deadline elapsed before a result was produced. Retryable.
    #[error("{0}")]
    Timeout(String),

    /// The embedding provider failed for a reason other than timing out.
    #[error("embedding provider failed: {0}")]
    Embedding(String),
}

impl From<EmbeddingError> for PricingError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Timeout => {
                PricingError::Timeout("embedding provider timed out".to_string())
            }
            other => PricingError::Embedding(other.to_string()),
        }
    }
}
