//! Embedding client: the only module that talks to the external embedding service.
//!
//! The pricing core depends on the `EmbeddingProvider` trait, never on HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("embedding response contained no vector")]
    Empty,

    #[error("embedding request timed out")]
    Timeout,
}

/// Turns free text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI-compatible `/embeddings` client with a per-call timeout.
/// Retries 429 and 5xx responses up to `max_retries` times with exponential backoff.
#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl HttpEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/embeddings", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn call_once(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: [text],
        };
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(classify)?;
        parse_embedding(&body)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut attempt = 0;
        loop {
            match self.call_once(text).await {
                Ok(vector) => {
                    debug!(dimensions = vector.len(), "embedding call succeeded");
                    return Ok(vector);
                }
                Err(err) if attempt < self.max_retries && is_retryable(&err) => {
                    attempt += 1;
                    let delay = backoff_delay(attempt);
                    warn!(
                        "embedding call failed ({err}), retry {attempt}/{} after {}ms",
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn classify(err: reqwest::Error) -> EmbeddingError {
    if err.is_timeout() {
        EmbeddingError::Timeout
    } else {
        EmbeddingError::Http(err)
    }
}

/// Exponential backoff: 200ms, 400ms, 800ms, ... capped at 10s.
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(200u64.saturating_mul(factor).min(10_000))
}

fn is_retryable(err: &EmbeddingError) -> bool {
    match err {
        EmbeddingError::Api { status, .. } => *status == 429 || *status >= 500,
        EmbeddingError::Http(_) => true,
        _ => false,
    }
}

/// Extracts the first vector (by `index`) from an embeddings response body.
fn parse_embedding(body: &str) -> Result<Vec<f32>, EmbeddingError> {
    let response: EmbeddingResponse = serde_json::from_str(body)?;
    let vector = response
        .data
        .into_iter()
        .min_by_key(|item| item.index)
        .map(|item| item.embedding)
        .ok_or(EmbeddingError::Empty)?;
    if vector.is_empty() {
        return Err(EmbeddingError::Empty);
    }
    Ok(vector)
}
