use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pricing::error::PricingError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data quality error: {0}")]
    DataQuality(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Validation(msg) => AppError::Validation(msg),
            PricingError::NotFound(msg) => AppError::NotFound(msg),
            PricingError::NoSalaryData(msg) => AppError::DataQuality(msg),
            PricingError::Timeout(msg) => AppError::Timeout(msg),
            PricingError::Embedding(msg) => AppError::Upstream(msg),
        }
    }
}

/// Malformed or incomplete request bodies are validation failures, reported in
/// the same JSON shape as every other error.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::DataQuality(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "DATA_QUALITY_ERROR",
                msg.clone(),
            ),
            AppError::Timeout(msg) => {
                tracing::warn!("Request timed out: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", msg.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The embedding service is unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_errors_map_to_distinct_statuses() {
        let cases = [
            (PricingError::Validation("v".into()), StatusCode::BAD_REQUEST),
            (PricingError::NotFound("n".into()), StatusCode::NOT_FOUND),
            (PricingError::NoSalaryData("d".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (PricingError::Timeout("t".into()), StatusCode::GATEWAY_TIMEOUT),
            (PricingError::Embedding("e".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_reload_failures_are_internal() {
        let err: AppError = anyhow::anyhow!("connection refused")
            .context("Failed to load benchmark jobs")
            .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
