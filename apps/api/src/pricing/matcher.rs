//! Job Matcher: ranks benchmark jobs by cosine similarity to a free-text query.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RecommendationConfig;
use crate::embedding::EmbeddingProvider;
use crate::models::benchmark::BenchmarkJob;
use crate::pricing::error::PricingError;
use crate::pricing::store::BenchmarkRepository;

pub const MIN_TITLE_CHARS: usize = 3;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchQuery {
    pub job_title: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub job_family: Option<String>,
    #[serde(default)]
    pub career_level: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    High,
    Medium,
    Low,
}

/// One ranked benchmark job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub job_code: String,
    #[serde(rename = "job_title")]
    pub title: String,
    pub family: String,
    pub career_level: String,
    #[serde(rename = "similarity")]
    pub similarity_score: f64,
    #[serde(rename = "confidence")]
    pub confidence_bucket: MatchConfidence,
}

pub struct JobMatcher {
    embedder: Arc<dyn EmbeddingProvider>,
    min_similarity: f64,
    high_similarity: f64,
    default_top_k: usize,
    max_top_k: usize,
}

impl JobMatcher {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: &RecommendationConfig) -> Self {
        Self {
            embedder,
            min_similarity: config.min_similarity,
            high_similarity: config.high_similarity,
            default_top_k: config.default_top_k,
            max_top_k: config.max_top_k,
        }
    }

    /// Clamps a requested result count to `[1, max_top_k]`.
    pub fn clamp_top_k(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_top_k)
            .clamp(1, self.max_top_k.max(1))
    }

    /// Top-K benchmark jobs at or above the similarity floor, best first.
    /// An empty list means nothing matched well enough; it is not an error here.
    pub async fn find_similar_jobs(
        &self,
        repo: &dyn BenchmarkRepository,
        query: &MatchQuery,
    ) -> Result<Vec<MatchResult>, PricingError> {
        let title = validate_title(&query.job_title)?;
        let text = normalize_query(title, query.job_description.as_deref());
        let vector = self.embedder.embed(&text).await?;
        if vector.is_empty() {
            return Err(PricingError::Embedding(
                "provider returned an empty vector".to_string(),
            ));
        }

        Ok(self.rank(
            repo,
            &vector,
            query.job_family.as_deref(),
            query.career_level.as_deref(),
            self.clamp_top_k(query.top_k),
        ))
    }

    /// The single best match, if it clears the similarity floor.
    pub async fn find_best_match(
        &self,
        repo: &dyn BenchmarkRepository,
        query: &MatchQuery,
    ) -> Result<Option<MatchResult>, PricingError> {
        let query = MatchQuery {
            top_k: Some(1),
            ..query.clone()
        };
        let matches = self.find_similar_jobs(repo, &query).await?;
        Ok(matches
            .into_iter()
            .next()
            .filter(|m| m.similarity_score >= self.min_similarity))
    }

    /// Scores every candidate passing the filters and keeps the best `top_k`.
    /// Ties are broken by `job_code` ascending.
    pub fn rank(
        &self,
        repo: &dyn BenchmarkRepository,
        query_vector: &[f32],
        family: Option<&str>,
        career_level: Option<&str>,
        top_k: usize,
    ) -> Vec<MatchResult> {
        let candidates: Vec<&BenchmarkJob> = repo
            .benchmark_jobs()
            .iter()
            .filter(|job| passes_filter(&job.family, family))
            .filter(|job| passes_filter(&job.career_level, career_level))
            .collect();

        let mut scored: Vec<(&BenchmarkJob, f64)> = Vec::with_capacity(candidates.len());
        for &job in &candidates {
            match cosine_similarity(query_vector, &job.embedding) {
                Some(score) if score >= self.min_similarity => scored.push((job, score)),
                Some(_) => {}
                None => warn!(
                    job_code = %job.job_code,
                    expected = query_vector.len(),
                    actual = job.embedding.len(),
                    "skipping benchmark job with mismatched embedding"
                ),
            }
        }

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.job_code.cmp(&b.0.job_code)));
        scored.truncate(top_k);

        debug!(
            candidates = candidates.len(),
            matched = scored.len(),
            "ranked benchmark jobs"
        );

        scored
            .into_iter()
            .map(|(job, score)| MatchResult {
                job_code: job.job_code.clone(),
                title: job.title.clone(),
                family: job.family.clone(),
                career_level: job.career_level.clone(),
                similarity_score: score,
                confidence_bucket: self.bucket(score),
            })
            .collect()
    }

    fn bucket(&self, score: f64) -> MatchConfidence {
        if score >= self.high_similarity {
            MatchConfidence::High
        } else if score >= self.min_similarity {
            MatchConfidence::Medium
        } else {
            MatchConfidence::Low
        }
    }
}

/// Trims the title and rejects it when shorter than `MIN_TITLE_CHARS`.
pub fn validate_title(title: &str) -> Result<&str, PricingError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(PricingError::Validation(
            "job_title cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() < MIN_TITLE_CHARS {
        return Err(PricingError::Validation(format!(
            "job_title must be at least {MIN_TITLE_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Lowercases and collapses whitespace in `title` + `description`. This is the
/// exact text sent to the embedding provider.
pub fn normalize_query(title: &str, description: Option<&str>) -> String {
    let mut text = title.to_lowercase();
    if let Some(description) = description {
        text.push(' ');
        text.push_str(&description.to_lowercase());
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn passes_filter(value: &str, filter: Option<&str>) -> bool {
    match filter.map(str::trim) {
        None | Some("") => true,
        Some(wanted) => value.trim().eq_ignore_ascii_case(wanted),
    }
}

/// Cosine similarity clamped to `[0, 1]`; zero-norm vectors score 0.
/// `None` when the dimensions differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return Some(0.0);
    }
    Some((dot / denom).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::store::BenchmarkSnapshot;
    use crate::pricing::testing;

    fn matcher() -> JobMatcher {
        JobMatcher::new(testing::embedder(), &RecommendationConfig::default())
    }

    fn query(title: &str) -> MatchQuery {
        MatchQuery {
            job_title: title.to_string(),
            ..MatchQuery::default()
        }
    }

    #[test]
    fn test_normalize_query_collapses_case_and_space() {
        assert_eq!(
            normalize_query("  Senior   HR\tManager ", Some("Leads  the TEAM")),
            "senior hr manager leads the team"
        );
        assert_eq!(normalize_query("HR MANAGER", None), normalize_query("hr manager", None));
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("AB").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(" A B ").is_ok());
        assert_eq!(validate_title("  HR Manager ").unwrap(), "HR Manager");
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
    }

    #[test]
    fn test_clamp_top_k() {
        let m = matcher();
        assert_eq!(m.clamp_top_k(None), 5);
        assert_eq!(m.clamp_top_k(Some(0)), 1);
        assert_eq!(m.clamp_top_k(Some(50)), 10);
        assert_eq!(m.clamp_top_k(Some(3)), 3);
    }

    #[tokio::test]
    async fn test_finds_hr_business_partner() {
        let snapshot = testing::snapshot();
        let matches = matcher()
            .find_similar_jobs(&snapshot, &query("Senior HR Business Partner"))
            .await
            .unwrap();

        let codes: Vec<&str> = matches.iter().map(|m| m.job_code.as_str()).collect();
        assert_eq!(codes, vec!["HRM-BP-M5", "HRM-BP-M4"]);
        assert!((matches[0].similarity_score - 1.0).abs() < 1e-9);
        assert_eq!(matches[0].confidence_bucket, MatchConfidence::High);
        assert!(matches[1].similarity_score >= 0.70);
        assert!(matches
            .windows(2)
            .all(|w| w[0].similarity_score >= w[1].similarity_score));
    }

    #[tokio::test]
    async fn test_case_insensitive_matching() {
        let snapshot = testing::snapshot();
        let m = matcher();
        let lower = m.find_similar_jobs(&snapshot, &query("hr manager")).await.unwrap();
        let upper = m.find_similar_jobs(&snapshot, &query("HR   MANAGER")).await.unwrap();

        assert!(!lower.is_empty());
        assert_eq!(lower.len(), upper.len());
        for (a, b) in lower.iter().zip(upper.iter()) {
            assert_eq!(a.job_code, b.job_code);
            assert!((a.similarity_score - b.similarity_score).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_nonsense_title_returns_empty() {
        let snapshot = testing::snapshot();
        let matches = matcher()
            .find_similar_jobs(&snapshot, &query("Completely Nonexistent Job XYZ123"))
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_family_filter_ignores_case() {
        let snapshot = testing::snapshot();
        let mut q = query("Software Engineer");
        q.job_family = Some("hrm".to_string());
        let matches = matcher().find_similar_jobs(&snapshot, &q).await.unwrap();
        assert!(matches.is_empty());

        q.job_family = Some("ENG".to_string());
        let matches = matcher().find_similar_jobs(&snapshot, &q).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].job_code, "ENG-SWE-M4");
    }

    #[tokio::test]
    async fn test_career_level_filter() {
        let snapshot = testing::snapshot();
        let mut q = query("Senior HR Business Partner");
        q.career_level = Some("m4".to_string());
        let matches = matcher().find_similar_jobs(&snapshot, &q).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].job_code, "HRM-BP-M4");
    }

    #[tokio::test]
    async fn test_short_title_rejected_before_embedding() {
        let snapshot = testing::snapshot();
        let m = JobMatcher::new(
            Arc::new(testing::FailingEmbedder),
            &RecommendationConfig::default(),
        );
        let err = m.find_similar_jobs(&snapshot, &query("AB")).await.unwrap_err();
        assert!(matches!(err, PricingError::Validation(_)));
    }

    #[tokio::test]
    async fn test_best_match() {
        let snapshot = testing::snapshot();
        let m = matcher();
        let best = m.find_best_match(&snapshot, &query("HR Business Partner")).await.unwrap();
        assert_eq!(best.unwrap().job_code, "HRM-BP-M4");

        let none = m
            .find_best_match(&snapshot, &query("Completely Nonexistent Job XYZ123"))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_ties_broken_by_job_code() {
        let snapshot = BenchmarkSnapshot::new(
            vec![
                testing::job("Z-1", "HR Manager", "HRM", "M5"),
                testing::job("A-1", "HR Manager", "HRM", "M5"),
                testing::job("M-1", "HR Manager", "HRM", "M5"),
            ],
            vec![],
            vec![],
        );
        let vector = testing::vectorize("hr manager");
        let ranked = matcher().rank(&snapshot, &vector, None, None, 2);
        let codes: Vec<&str> = ranked.iter().map(|m| m.job_code.as_str()).collect();
        assert_eq!(codes, vec!["A-1", "M-1"]);
    }

    #[test]
    fn test_mismatched_dimensions_skipped() {
        let snapshot = BenchmarkSnapshot::new(
            vec![
                BenchmarkJob::new("BAD-1", "HR Manager", "HRM", "M5", vec![1.0, 0.0]).unwrap(),
                testing::job("HRM-MGR-M5", "HR Manager", "HRM", "M5"),
            ],
            vec![],
            vec![],
        );
        let vector = testing::vectorize("hr manager");
        let ranked = matcher().rank(&snapshot, &vector, None, None, 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].job_code, "HRM-MGR-M5");
    }

    #[test]
    fn test_bucket_thresholds() {
        let m = matcher();
        assert_eq!(m.bucket(0.90), MatchConfidence::High);
        assert_eq!(m.bucket(0.85), MatchConfidence::High);
        assert_eq!(m.bucket(0.75), MatchConfidence::Medium);
        assert_eq!(m.bucket(0.50), MatchConfidence::Low);
    }
}
