use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::pricing::recommender::RecommendationEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Source of benchmark snapshots; only touched on reload.
    pub db: PgPool,
    pub engine: Arc<RecommendationEngine>,
    pub config: Config,
}
