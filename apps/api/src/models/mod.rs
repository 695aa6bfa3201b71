//! Record types read by the pricing engine.
//!
//! Each module carries a `*Row` type mapped straight from Postgres and a domain
//! type whose constructor enforces the record's invariants.

pub mod benchmark;
pub mod location;
pub mod market;

use thiserror::Error;

/// Raised when a record violates its invariants at the ingestion boundary.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("percentiles must be strictly ascending, got p25={p25} p50={p50} p75={p75}")]
    PercentileOrder { p25: f64, p50: f64, p75: f64 },

    #[error("embedding contains non-finite values")]
    NonFiniteEmbedding,
}

pub(crate) fn require_text(field: &'static str, value: String) -> Result<String, RecordError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RecordError::Empty { field });
    }
    Ok(trimmed.to_string())
}
