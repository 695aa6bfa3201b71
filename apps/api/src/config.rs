use std::str::FromStr;

use anyhow::{ensure, Context, Result};
use serde::Serialize;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub embedding: EmbeddingConfig,
    pub recommendation: RecommendationConfig,
    pub port: u16,
    pub rust_log: String,
}

/// Connection settings for the external embedding service.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

/// Upper bound on `EMBEDDING_MAX_RETRIES`; the backoff doubles per attempt.
pub const MAX_EMBEDDING_RETRIES: u32 = 5;

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.timeout_ms > 0, "embedding timeout_ms must be positive");
        ensure!(
            self.max_retries <= MAX_EMBEDDING_RETRIES,
            "embedding max_retries must be at most {MAX_EMBEDDING_RETRIES}, got {}",
            self.max_retries
        );
        Ok(())
    }
}

/// Tunable constants of the recommendation engine.
///
/// Passed into the engine at construction; nothing in `pricing` reads the
/// environment directly.
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    /// Similarity floor below which a benchmark job is not a match.
    pub min_similarity: f64,
    /// Similarity at or above which a match is bucketed as `high`.
    pub high_similarity: f64,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub weights: ConfidenceWeights,
    /// Aggregate score at or above which confidence is `High`.
    pub high_confidence: u32,
    /// Aggregate score at or above which confidence is `Medium`.
    pub medium_confidence: u32,
    /// Total survey sample size that earns a full sample-size factor.
    pub full_sample_size: u32,
    pub fresh_survey_months: f64,
    pub stale_survey_months: f64,
    pub request_timeout_ms: u64,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceWeights {
    pub job_match: f64,
    pub data_points: f64,
    pub sample_size: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            job_match: 1.0 / 3.0,
            data_points: 1.0 / 3.0,
            sample_size: 1.0 / 3.0,
        }
    }
}

impl ConfidenceWeights {
    /// Rescales the weights so they sum to 1.0.
    pub fn normalized(&self) -> Self {
        let total = self.job_match + self.data_points + self.sample_size;
        if total <= 0.0 {
            return Self::default();
        }
        Self {
            job_match: self.job_match / total,
            data_points: self.data_points / total,
            sample_size: self.sample_size / total,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.70,
            high_similarity: 0.85,
            default_top_k: 5,
            max_top_k: 10,
            weights: ConfidenceWeights::default(),
            high_confidence: 75,
            medium_confidence: 50,
            full_sample_size: 100,
            fresh_survey_months: 12.0,
            stale_survey_months: 60.0,
            request_timeout_ms: 5_000,
            currency: "SGD".to_string(),
        }
    }
}

impl RecommendationConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            min_similarity: env_or("PRICING_MIN_SIMILARITY", defaults.min_similarity)?,
            high_similarity: env_or("PRICING_HIGH_SIMILARITY", defaults.high_similarity)?,
            default_top_k: env_or("PRICING_DEFAULT_TOP_K", defaults.default_top_k)?,
            max_top_k: env_or("PRICING_MAX_TOP_K", defaults.max_top_k)?,
            weights: ConfidenceWeights {
                job_match: env_or("PRICING_WEIGHT_JOB_MATCH", defaults.weights.job_match)?,
                data_points: env_or("PRICING_WEIGHT_DATA_POINTS", defaults.weights.data_points)?,
                sample_size: env_or("PRICING_WEIGHT_SAMPLE_SIZE", defaults.weights.sample_size)?,
            },
            high_confidence: env_or("PRICING_HIGH_CONFIDENCE", defaults.high_confidence)?,
            medium_confidence: env_or("PRICING_MEDIUM_CONFIDENCE", defaults.medium_confidence)?,
            full_sample_size: env_or("PRICING_FULL_SAMPLE_SIZE", defaults.full_sample_size)?,
            fresh_survey_months: env_or(
                "PRICING_FRESH_SURVEY_MONTHS",
                defaults.fresh_survey_months,
            )?,
            stale_survey_months: env_or(
                "PRICING_STALE_SURVEY_MONTHS",
                defaults.stale_survey_months,
            )?,
            request_timeout_ms: env_or("PRICING_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)?,
            currency: std::env::var("PRICING_CURRENCY").unwrap_or(defaults.currency),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.min_similarity),
            "min_similarity must be within [0, 1], got {}",
            self.min_similarity
        );
        ensure!(
            (self.min_similarity..=1.0).contains(&self.high_similarity),
            "high_similarity must be within [min_similarity, 1], got {}",
            self.high_similarity
        );
        ensure!(self.max_top_k >= 1, "max_top_k must be at least 1");
        ensure!(
            (1..=self.max_top_k).contains(&self.default_top_k),
            "default_top_k must be within [1, max_top_k]"
        );
        let w = &self.weights;
        ensure!(
            w.job_match >= 0.0 && w.data_points >= 0.0 && w.sample_size >= 0.0,
            "confidence weights must be non-negative"
        );
        ensure!(
            w.job_match + w.data_points + w.sample_size > 0.0,
            "at least one confidence weight must be positive"
        );
        ensure!(
            self.medium_confidence <= self.high_confidence && self.high_confidence <= 100,
            "confidence thresholds must satisfy medium <= high <= 100"
        );
        ensure!(self.full_sample_size > 0, "full_sample_size must be positive");
        ensure!(
            self.fresh_survey_months < self.stale_survey_months,
            "fresh_survey_months must be less than stale_survey_months"
        );
        ensure!(self.request_timeout_ms > 0, "request_timeout_ms must be positive");
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: require_env("DATABASE_URL")?,
            embedding: EmbeddingConfig {
                api_base: std::env::var("EMBEDDING_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                api_key: require_env("EMBEDDING_API_KEY")?,
                model: std::env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
                timeout_ms: env_or("EMBEDDING_TIMEOUT_MS", 3_000)?,
                max_retries: env_or("EMBEDDING_MAX_RETRIES", 1)?,
            },
            recommendation: RecommendationConfig::from_env()?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };
        config.embedding.validate()?;
        Ok(config)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
