use serde::Serialize;
use sqlx::FromRow;

use crate::models::{require_text, RecordError};

#[derive(Debug, Clone, FromRow)]
pub struct BenchmarkJobRow {
    pub job_code: String,
    pub title: String,
    pub family: String,
    pub subfamily: Option<String>,
    pub career_level: String,
    pub description: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

/// A standardized reference job with its precomputed embedding.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BenchmarkJob {
    pub job_code: String,
    pub title: String,
    pub family: String,
    pub subfamily: Option<String>,
    pub career_level: String,
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub embedding: Vec<f32>,
}

impl BenchmarkJob {
    pub fn new(
        job_code: impl Into<String>,
        title: impl Into<String>,
        family: impl Into<String>,
        career_level: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Result<Self, RecordError> {
        let career_level: String = career_level.into();
        if embedding.is_empty() {
            return Err(RecordError::Empty { field: "embedding" });
        }
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(RecordError::NonFiniteEmbedding);
        }
        Ok(Self {
            job_code: require_text("job_code", job_code.into())?,
            title: require_text("title", title.into())?,
            family: require_text("family", family.into())?,
            subfamily: None,
            career_level: career_level.trim().to_string(),
            description: None,
            embedding,
        })
    }

    pub fn with_subfamily(mut self, subfamily: impl Into<String>) -> Self {
        self.subfamily = Some(subfamily.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl TryFrom<BenchmarkJobRow> for BenchmarkJob {
    type Error = RecordError;

    fn try_from(row: BenchmarkJobRow) -> Result<Self, Self::Error> {
        let mut job = BenchmarkJob::new(
            row.job_code,
            row.title,
            row.family,
            row.career_level,
            row.embedding.unwrap_or_default(),
        )?;
        if let Some(subfamily) = row.subfamily.filter(|s| !s.trim().is_empty()) {
            job = job.with_subfamily(subfamily.trim());
        }
        if let Some(description) = row.description.filter(|s| !s.trim().is_empty()) {
            job = job.with_description(description);
        }
        Ok(job)
    }
}
