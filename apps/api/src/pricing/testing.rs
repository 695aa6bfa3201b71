//! Deterministic fixtures for pricing tests: a vocabulary embedder and a small
//! HR benchmark library.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::models::benchmark::BenchmarkJob;
use crate::models::location::LocationRecord;
use crate::models::market::MarketDataRecord;
use crate::pricing::matcher::normalize_query;
use crate::pricing::store::BenchmarkSnapshot;

const VOCABULARY: &[&str] = &[
    "hr",
    "business",
    "partner",
    "manager",
    "senior",
    "talent",
    "acquisition",
    "specialist",
    "compensation",
    "benefits",
    "analyst",
    "software",
    "engineer",
    "payroll",
    "officer",
];

const UNKNOWN_BUCKETS: usize = 8;

/// One dimension per vocabulary word, plus hashed buckets for anything else.
/// Case-sensitive on purpose: only normalized text lands on vocabulary dimensions.
pub fn vectorize(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; VOCABULARY.len() + UNKNOWN_BUCKETS];
    for token in text.split_whitespace() {
        let slot = match VOCABULARY.iter().position(|w| *w == token) {
            Some(i) => i,
            None => {
                let sum: usize = token.bytes().map(usize::from).sum();
                VOCABULARY.len() + sum % UNKNOWN_BUCKETS
            }
        };
        vector[slot] += 1.0;
    }
    vector
}

pub struct VocabularyEmbedder;

#[async_trait]
impl EmbeddingProvider for VocabularyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vectorize(text))
    }
}

pub struct SlowEmbedder(pub Duration);

#[async_trait]
impl EmbeddingProvider for SlowEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        tokio::time::sleep(self.0).await;
        Ok(vectorize(text))
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

pub fn embedder() -> Arc<dyn EmbeddingProvider> {
    Arc::new(VocabularyEmbedder)
}

pub fn job(code: &str, title: &str, family: &str, level: &str) -> BenchmarkJob {
    BenchmarkJob::new(code, title, family, level, vectorize(&normalize_query(title, None)))
        .unwrap()
}

pub fn survey_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

/// A date six months after every fixture survey.
pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

pub fn market(code: &str, p25: f64, p50: f64, p75: f64) -> MarketDataRecord {
    MarketDataRecord::new(code, p25, p50, p75, "Mercer Total Remuneration Survey")
        .unwrap()
        .with_currency("SGD")
        .with_survey_date(survey_date())
}

pub fn snapshot() -> BenchmarkSnapshot {
    BenchmarkSnapshot::new(
        vec![
            job("HRM-BP-M4", "HR Business Partner", "HRM", "M4"),
            job("HRM-BP-M5", "Senior HR Business Partner", "HRM", "M5"),
            job("HRM-MGR-M5", "HR Manager", "HRM", "M5"),
            job("HRM-TA-M3", "Talent Acquisition Specialist", "HRM", "M3"),
            job("HRM-CB-M4", "Compensation Benefits Analyst", "HRM", "M4"),
            job("HRM-PAY-M3", "Payroll Officer", "HRM", "M3"),
            job("ENG-SWE-M4", "Software Engineer", "ENG", "M4"),
        ],
        vec![
            market("HRM-BP-M4", 84_000.0, 96_000.0, 110_000.0).with_sample_size(40),
            market("HRM-BP-M5", 105_000.0, 120_000.0, 138_000.0).with_sample_size(25),
            market("HRM-MGR-M5", 98_000.0, 112_000.0, 130_000.0),
            market("HRM-TA-M3", 60_000.0, 68_000.0, 77_000.0),
            market("HRM-CB-M4", 70_000.0, 79_000.0, 90_000.0),
            market("ENG-SWE-M4", 90_000.0, 104_000.0, 121_000.0),
        ],
        vec![
            LocationRecord::new("Central Business District", 1.0).unwrap(),
            LocationRecord::new("Marina Bay", 1.15).unwrap(),
            LocationRecord::new("Jurong", 0.92).unwrap(),
        ],
    )
}
