//! Axum route handlers for the pricing API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::location::LocationRecord;
use crate::pricing::loader::load_snapshot;
use crate::pricing::matcher::{MatchQuery, MatchResult};
use crate::pricing::recommender::{RecommendRequest, RecommendationResult};
use crate::pricing::store::SnapshotCounts;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: RecommendationResult,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub success: bool,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Serialize)]
pub struct BestMatchResponse {
    pub success: bool,
    #[serde(rename = "match")]
    pub best: Option<MatchResult>,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub success: bool,
    pub locations: Vec<LocationRecord>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    #[serde(flatten)]
    pub counts: SnapshotCounts,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/salary/recommend
///
/// Full pipeline: match → aggregate → location adjust → confidence.
pub async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, AppError> {
    let Json(request) = payload?;
    let span = info_span!("recommend", request_id = %Uuid::new_v4());
    let result = state.engine.recommend(&request).instrument(span).await?;

    Ok(Json(RecommendResponse {
        success: true,
        result,
    }))
}

/// POST /api/v1/jobs/match
///
/// Top-K similar benchmark jobs, without pricing. Empty when nothing clears the floor.
pub async fn handle_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchQuery>, JsonRejection>,
) -> Result<Json<MatchResponse>, AppError> {
    let Json(query) = payload?;
    let matches = state.engine.find_similar_jobs(&query).await?;
    Ok(Json(MatchResponse {
        success: true,
        matches,
    }))
}

/// POST /api/v1/jobs/best-match
pub async fn handle_best_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchQuery>, JsonRejection>,
) -> Result<Json<BestMatchResponse>, AppError> {
    let Json(query) = payload?;
    let best = state.engine.find_best_match(&query).await?;
    Ok(Json(BestMatchResponse {
        success: true,
        best,
    }))
}

/// GET /api/v1/locations
pub async fn handle_list_locations(
    State(state): State<AppState>,
) -> Result<Json<LocationsResponse>, AppError> {
    let snapshot = state.engine.store().snapshot();
    let locations = snapshot.locations().into_iter().cloned().collect();
    Ok(Json(LocationsResponse {
        success: true,
        locations,
    }))
}

/// POST /api/v1/admin/benchmarks/reload
///
/// Rebuilds the snapshot from Postgres and swaps it in. Requests already running
/// finish against the snapshot they started with.
pub async fn handle_reload(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let snapshot = load_snapshot(&state.db).await?;
    let counts = state.engine.store().replace(snapshot);
    info!(jobs = counts.jobs, "benchmark snapshot replaced");
    Ok(Json(ReloadResponse {
        success: true,
        counts,
    }))
}
