use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version, embedding model, and the size of the loaded benchmark snapshot.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let counts = state.engine.store().snapshot().counts();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "pricing-api",
        "embedding_model": state.config.embedding.model,
        "benchmark_jobs": counts.jobs,
        "market_records": counts.market_records,
        "locations": counts.locations,
    }))
}
