//! Confidence Scorer: three 0–100 factors combined into one score and level.
//!
//! - `job_match`: best similarity, mapped linearly from [floor, 1.0] to [0, 100]
//! - `data_points`: contributing market records relative to the requested top-K
//! - `sample_size`: total survey sample size when tracked, else survey recency
//!
//! `score = round(Σ weight × factor)`. Factors are reported alongside the weights
//! so the score can be recomputed by the caller to within 1 point.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{ConfidenceWeights, RecommendationConfig};
use crate::pricing::aggregator::Contribution;
use crate::pricing::matcher::MatchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceFactors {
    pub job_match: f64,
    pub data_points: f64,
    pub sample_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confidence {
    pub score: u32,
    pub level: ConfidenceLevel,
    pub factors: ConfidenceFactors,
    pub weights: ConfidenceWeights,
}

pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
    min_similarity: f64,
    high_confidence: u32,
    medium_confidence: u32,
    full_sample_size: u32,
    fresh_survey_months: f64,
    stale_survey_months: f64,
}

impl ConfidenceScorer {
    pub fn new(config: &RecommendationConfig) -> Self {
        Self {
            weights: config.weights.normalized(),
            min_similarity: config.min_similarity,
            high_confidence: config.high_confidence,
            medium_confidence: config.medium_confidence,
            full_sample_size: config.full_sample_size.max(1),
            fresh_survey_months: config.fresh_survey_months,
            stale_survey_months: config.stale_survey_months,
        }
    }

    /// Scores a recommendation. `as_of` anchors survey recency so the result is
    /// reproducible for a fixed date.
    pub fn score(
        &self,
        matches: &[MatchResult],
        contributions: &[Contribution],
        top_k: usize,
        as_of: NaiveDate,
    ) -> Confidence {
        let raw = ConfidenceFactors {
            job_match: self.job_match_factor(matches),
            data_points: data_points_factor(contributions.len(), top_k),
            sample_size: self.sample_size_factor(contributions, as_of),
        };

        let weighted = self.weights.job_match * raw.job_match
            + self.weights.data_points * raw.data_points
            + self.weights.sample_size * raw.sample_size;
        let score = weighted.round().clamp(0.0, 100.0) as u32;

        Confidence {
            score,
            level: self.level(score),
            factors: ConfidenceFactors {
                job_match: round1(raw.job_match),
                data_points: round1(raw.data_points),
                sample_size: round1(raw.sample_size),
            },
            weights: self.weights,
        }
    }

    pub fn level(&self, score: u32) -> ConfidenceLevel {
        match score {
            s if s >= self.high_confidence => ConfidenceLevel::High,
            s if s >= self.medium_confidence => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }

    fn job_match_factor(&self, matches: &[MatchResult]) -> f64 {
        let best = matches
            .iter()
            .map(|m| m.similarity_score)
            .fold(f64::NEG_INFINITY, f64::max);
        if !best.is_finite() {
            return 0.0;
        }
        let span = 1.0 - self.min_similarity;
        if span <= f64::EPSILON {
            return if best >= 1.0 { 100.0 } else { 0.0 };
        }
        ((best - self.min_similarity) / span).clamp(0.0, 1.0) * 100.0
    }

    fn sample_size_factor(&self, contributions: &[Contribution], as_of: NaiveDate) -> f64 {
        let tracked: Vec<u32> = contributions.iter().filter_map(|c| c.sample_size).collect();
        if !tracked.is_empty() {
            let total: u64 = tracked.iter().map(|&n| u64::from(n)).sum();
            return (total as f64 / f64::from(self.full_sample_size)).min(1.0) * 100.0;
        }

        match contributions.iter().filter_map(|c| c.survey_date).max() {
            Some(newest) => self.recency_factor(months_between(newest, as_of)),
            None => 0.0,
        }
    }

    /// 100 up to the fresh age, 0 from the stale age, linear in between.
    fn recency_factor(&self, age_months: f64) -> f64 {
        if age_months <= self.fresh_survey_months {
            100.0
        } else if age_months >= self.stale_survey_months {
            0.0
        } else {
            let span = self.stale_survey_months - self.fresh_survey_months;
            (1.0 - (age_months - self.fresh_survey_months) / span) * 100.0
        }
    }
}

fn data_points_factor(contributing: usize, top_k: usize) -> f64 {
    if top_k == 0 {
        return 0.0;
    }
    (contributing as f64 / top_k as f64).min(1.0) * 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let total = years * 12 + months;
    let day_frac = (end.day() as f64 - start.day() as f64) / 30.0;
    (total as f64 + day_frac).max(0.0)
}
