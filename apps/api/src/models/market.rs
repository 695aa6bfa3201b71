use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{require_text, RecordError};

#[derive(Debug, Clone, FromRow)]
pub struct MarketDataRow {
    pub job_code: String,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub currency: Option<String>,
    pub survey_name: String,
    pub survey_date: Option<NaiveDate>,
    pub sample_size: Option<i32>,
}

/// Percentile pay data for one benchmark job.
///
/// Invariant: `0 < p25 < p50 < p75`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketDataRecord {
    pub job_code: String,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub currency: Option<String>,
    pub survey_name: String,
    pub survey_date: Option<NaiveDate>,
    pub sample_size: Option<u32>,
}

impl MarketDataRecord {
    pub fn new(
        job_code: impl Into<String>,
        p25: f64,
        p50: f64,
        p75: f64,
        survey_name: impl Into<String>,
    ) -> Result<Self, RecordError> {
        check_percentiles(p25, p50, p75)?;
        Ok(Self {
            job_code: require_text("job_code", job_code.into())?,
            p25,
            p50,
            p75,
            currency: None,
            survey_name: require_text("survey_name", survey_name.into())?,
            survey_date: None,
            sample_size: None,
        })
    }

    pub fn with_survey_date(mut self, date: NaiveDate) -> Self {
        self.survey_date = Some(date);
        self
    }

    pub fn with_sample_size(mut self, sample_size: u32) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Re-checks the percentile invariant; records built through `new` always pass.
    pub fn is_well_formed(&self) -> bool {
        check_percentiles(self.p25, self.p50, self.p75).is_ok()
    }
}

fn check_percentiles(p25: f64, p50: f64, p75: f64) -> Result<(), RecordError> {
    if !(p25.is_finite() && p25 > 0.0) {
        return Err(RecordError::NotPositive {
            field: "p25",
            value: p25,
        });
    }
    if !(p25 < p50 && p50 < p75 && p75.is_finite()) {
        return Err(RecordError::PercentileOrder { p25, p50, p75 });
    }
    Ok(())
}

impl TryFrom<MarketDataRow> for MarketDataRecord {
    type Error = RecordError;

    fn try_from(row: MarketDataRow) -> Result<Self, Self::Error> {
        let mut record =
            MarketDataRecord::new(row.job_code, row.p25, row.p50, row.p75, row.survey_name)?;
        if let Some(currency) = row.currency.filter(|c| !c.trim().is_empty()) {
            record = record.with_currency(currency.trim());
        }
        if let Some(date) = row.survey_date {
            record = record.with_survey_date(date);
        }
        // Negative sample sizes are treated as untracked.
        if let Some(n) = row.sample_size.and_then(|n| u32::try_from(n).ok()) {
            record = record.with_sample_size(n);
        }
        Ok(record)
    }
}
