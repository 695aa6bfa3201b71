pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pricing::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Salary recommendation
        .route("/api/v1/salary/recommend", post(handlers::handle_recommend))
        // Job matching preview
        .route("/api/v1/jobs/match", post(handlers::handle_match))
        .route("/api/v1/jobs/best-match", post(handlers::handle_best_match))
        // Location index
        .route("/api/v1/locations", get(handlers::handle_list_locations))
        // Admin
        .route(
            "/api/v1/admin/benchmarks/reload",
            post(handlers::handle_reload),
        )
        .with_state(state)
}
