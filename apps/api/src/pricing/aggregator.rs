//! Salary Aggregator: similarity-weighted blend of matched jobs' percentile pay.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::pricing::error::PricingError;
use crate::pricing::matcher::MatchResult;
use crate::pricing::store::BenchmarkRepository;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalaryRange {
    pub min: f64,
    pub target: f64,
    pub max: f64,
}

impl SalaryRange {
    pub fn is_ordered(&self) -> bool {
        self.min < self.target && self.target < self.max
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            target: self.target * factor,
            max: self.max * factor,
        }
    }

    /// Rounds each figure to cents.
    pub fn rounded(&self) -> Self {
        let round = |v: f64| (v * 100.0).round() / 100.0;
        Self {
            min: round(self.min),
            target: round(self.target),
            max: round(self.max),
        }
    }
}

/// A matched job whose market record took part in the blend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub job_code: String,
    /// Renormalized weight; all contributions sum to 1.0.
    pub weight: f64,
    pub survey_name: String,
    pub survey_date: Option<NaiveDate>,
    pub sample_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub range: SalaryRange,
    pub contributions: Vec<Contribution>,
}

/// Blends P25/P50/P75 of every match that has market data into min/target/max.
///
/// Matches without a record carry zero weight. Fails with `NoSalaryData` when
/// no match has a usable record.
pub fn aggregate(
    repo: &dyn BenchmarkRepository,
    matches: &[MatchResult],
) -> Result<Aggregation, PricingError> {
    let mut priced = Vec::with_capacity(matches.len());
    for m in matches {
        match repo.market_data(&m.job_code) {
            Some(record) if record.is_well_formed() => priced.push((m, record)),
            Some(record) => warn!(
                job_code = %m.job_code,
                p25 = record.p25,
                p50 = record.p50,
                p75 = record.p75,
                "ignoring malformed market record"
            ),
            None => debug!(job_code = %m.job_code, "no market data for match"),
        }
    }

    if priced.is_empty() {
        return Err(PricingError::NoSalaryData(format!(
            "{} matched job(s) found but none have market salary data",
            matches.len()
        )));
    }

    let total: f64 = priced.iter().map(|(m, _)| m.similarity_score.max(0.0)).sum();
    let weight_of = |m: &MatchResult| {
        if total > f64::EPSILON {
            m.similarity_score.max(0.0) / total
        } else {
            1.0 / priced.len() as f64
        }
    };

    let mut range = SalaryRange {
        min: 0.0,
        target: 0.0,
        max: 0.0,
    };
    let mut contributions = Vec::with_capacity(priced.len());
    for (m, record) in &priced {
        let weight = weight_of(*m);
        range.min += weight * record.p25;
        range.target += weight * record.p50;
        range.max += weight * record.p75;
        contributions.push(Contribution {
            job_code: m.job_code.clone(),
            weight,
            survey_name: record.survey_name.clone(),
            survey_date: record.survey_date,
            sample_size: record.sample_size,
        });
    }

    if !range.is_ordered() {
        return Err(PricingError::NoSalaryData(format!(
            "aggregated range is not ordered (min={}, target={}, max={})",
            range.min, range.target, range.max
        )));
    }

    Ok(Aggregation {
        range,
        contributions,
    })
}
