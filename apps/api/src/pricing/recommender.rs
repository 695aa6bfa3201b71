//! Recommendation Orchestrator.
//!
//! Validating → Matching → Aggregating → Adjusting → Scoring → Done, with any
//! stage able to fail. The whole run is bounded by the configured deadline.
//! Location lookup is deferred until matching has succeeded, but always happens
//! before any salary figure is computed.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::RecommendationConfig;
use crate::embedding::EmbeddingProvider;
use crate::pricing::aggregator::{aggregate, Contribution, SalaryRange};
use crate::pricing::confidence::{Confidence, ConfidenceScorer};
use crate::pricing::error::PricingError;
use crate::pricing::location::{adjust, resolve, LocationAdjustment};
use crate::pricing::matcher::{validate_title, JobMatcher, MatchQuery, MatchResult};
use crate::pricing::store::{BenchmarkRepository, BenchmarkStore};

pub const PERIOD_ANNUAL: &str = "annual";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendRequest {
    pub job_title: String,
    #[serde(default)]
    pub job_description: Option<String>,
    pub location: String,
    #[serde(default)]
    pub job_family: Option<String>,
    #[serde(default)]
    pub career_level: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Matching,
    Aggregating,
    Adjusting,
    Scoring,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSources {
    pub mercer_market_data: bool,
    pub surveys: Vec<String>,
    pub benchmark_jobs_considered: usize,
    /// Weight each priced match carried in the blend.
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub job_title: String,
    pub location: String,
    pub currency: String,
    pub period: &'static str,
    pub recommended_range: SalaryRange,
    pub confidence: Confidence,
    pub matched_jobs: Vec<MatchResult>,
    pub data_sources: DataSources,
    pub location_adjustment: LocationAdjustment,
}

/// Stateless per request; share one instance across all handlers.
pub struct RecommendationEngine {
    store: Arc<BenchmarkStore>,
    matcher: JobMatcher,
    scorer: ConfidenceScorer,
    currency: String,
    timeout: Duration,
}

impl RecommendationEngine {
    pub fn new(
        store: Arc<BenchmarkStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &RecommendationConfig,
    ) -> Self {
        Self {
            store,
            matcher: JobMatcher::new(embedder, config),
            scorer: ConfidenceScorer::new(config),
            currency: config.currency.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    pub fn store(&self) -> &BenchmarkStore {
        &self.store
    }

    pub async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<RecommendationResult, PricingError> {
        self.recommend_as_of(request, Utc::now().date_naive()).await
    }

    /// Same as `recommend`, with survey recency measured against `as_of`.
    pub async fn recommend_as_of(
        &self,
        request: &RecommendRequest,
        as_of: NaiveDate,
    ) -> Result<RecommendationResult, PricingError> {
        let deadline = Instant::now() + self.timeout;
        tokio::time::timeout_at(deadline, self.run(request, as_of, deadline))
            .await
            .unwrap_or_else(|_| Err(self.timeout_error()))
    }

    /// Job Matcher preview under the same deadline as a full recommendation.
    pub async fn find_similar_jobs(
        &self,
        query: &MatchQuery,
    ) -> Result<Vec<MatchResult>, PricingError> {
        let snapshot = self.store.snapshot();
        tokio::time::timeout(self.timeout, self.matcher.find_similar_jobs(&*snapshot, query))
            .await
            .unwrap_or_else(|_| Err(self.timeout_error()))
    }

    pub async fn find_best_match(
        &self,
        query: &MatchQuery,
    ) -> Result<Option<MatchResult>, PricingError> {
        let snapshot = self.store.snapshot();
        tokio::time::timeout(self.timeout, self.matcher.find_best_match(&*snapshot, query))
            .await
            .unwrap_or_else(|_| Err(self.timeout_error()))
    }

    async fn run(
        &self,
        request: &RecommendRequest,
        as_of: NaiveDate,
        deadline: Instant,
    ) -> Result<RecommendationResult, PricingError> {
        let mut stage = Stage::Validating;

        let title = validate_title(&request.job_title).map_err(|e| fail(stage, e))?;
        let location = request.location.trim();
        if location.is_empty() {
            return Err(fail(
                stage,
                PricingError::Validation("location is required".to_string()),
            ));
        }
        let top_k = self.matcher.clamp_top_k(request.top_k);

        // One snapshot for the whole request, released on return.
        let snapshot = self.store.snapshot();
        let repo: &dyn BenchmarkRepository = &*snapshot;

        advance(&mut stage, Stage::Matching);
        let query = MatchQuery {
            job_title: title.to_string(),
            job_description: request.job_description.clone(),
            job_family: request.job_family.clone(),
            career_level: request.career_level.clone(),
            top_k: Some(top_k),
        };
        let matches = self
            .matcher
            .find_similar_jobs(repo, &query)
            .await
            .map_err(|e| fail(stage, e))?;
        if Instant::now() > deadline {
            return Err(fail(stage, self.timeout_error()));
        }
        if matches.is_empty() {
            return Err(fail(
                stage,
                PricingError::NotFound(format!(
                    "No benchmark job is similar enough to '{title}' to recommend a salary"
                )),
            ));
        }

        // Deferred location check: fail before any salary figure is computed.
        resolve(repo, location).map_err(|e| fail(Stage::Validating, e))?;

        advance(&mut stage, Stage::Aggregating);
        let aggregation = aggregate(repo, &matches).map_err(|e| fail(stage, e))?;

        advance(&mut stage, Stage::Adjusting);
        let (adjusted, adjustment) =
            adjust(repo, &aggregation.range, location).map_err(|e| fail(stage, e))?;
        // Ordering must hold on the figures actually returned, after rounding to cents.
        let adjusted = adjusted.rounded();
        if !adjusted.is_ordered() {
            return Err(fail(
                stage,
                PricingError::NoSalaryData(format!(
                    "adjusted range for '{}' collapses when rounded to cents",
                    adjustment.location
                )),
            ));
        }

        advance(&mut stage, Stage::Scoring);
        let confidence = self
            .scorer
            .score(&matches, &aggregation.contributions, top_k, as_of);

        advance(&mut stage, Stage::Done);
        info!(
            job_title = %title,
            location = %adjustment.location,
            target = adjusted.target,
            score = confidence.score,
            level = ?confidence.level,
            "salary recommendation produced"
        );

        Ok(RecommendationResult {
            job_title: title.to_string(),
            location: adjustment.location.clone(),
            currency: self.currency.clone(),
            period: PERIOD_ANNUAL,
            recommended_range: adjusted,
            confidence,
            matched_jobs: matches,
            data_sources: data_sources(&aggregation.contributions, repo.benchmark_jobs().len()),
            location_adjustment: adjustment,
        })
    }

    fn timeout_error(&self) -> PricingError {
        PricingError::Timeout(format!(
            "request exceeded its {}ms deadline",
            self.timeout.as_millis()
        ))
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = ?*stage, to = ?next, "recommendation stage");
    *stage = next;
}

fn fail(stage: Stage, err: PricingError) -> PricingError {
    warn!(stage = ?stage, error = %err, "recommendation failed");
    err
}

fn data_sources(contributions: &[Contribution], considered: usize) -> DataSources {
    let surveys: BTreeSet<&str> = contributions
        .iter()
        .map(|c| c.survey_name.as_str())
        .collect();
    DataSources {
        mercer_market_data: surveys
            .iter()
            .any(|name| name.to_lowercase().contains("mercer")),
        surveys: surveys.into_iter().map(str::to_string).collect(),
        benchmark_jobs_considered: considered,
        contributions: contributions.to_vec(),
    }
}
