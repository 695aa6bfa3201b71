mod config;
mod db;
mod embedding;
mod errors;
mod models;
mod pricing;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::HttpEmbeddingProvider;
use crate::pricing::loader::load_snapshot;
use crate::pricing::recommender::RecommendationEngine;
use crate::pricing::store::BenchmarkStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pricing API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and load the benchmark snapshot
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(BenchmarkStore::new(load_snapshot(&db).await?));

    // Initialize embedding client
    let embedder = Arc::new(HttpEmbeddingProvider::new(&config.embedding)?);
    info!(
        "Embedding client initialized (model: {}, timeout: {}ms)",
        config.embedding.model, config.embedding.timeout_ms
    );

    let engine = RecommendationEngine::new(store, embedder, &config.recommendation);
    info!(
        "Recommendation engine ready (min similarity {}, deadline {}ms)",
        config.recommendation.min_similarity, config.recommendation.request_timeout_ms
    );

    let state = AppState {
        db,
        engine: Arc::new(engine),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
