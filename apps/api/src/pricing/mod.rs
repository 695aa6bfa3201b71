// Salary Recommendation Engine
// Job matching, salary aggregation, location adjustment, confidence scoring,
// and the orchestrator that sequences them. The embedding call goes through
// `embedding::EmbeddingProvider`; nothing here talks HTTP directly.

pub mod aggregator;
pub mod confidence;
pub mod error;
pub mod handlers;
pub mod loader;
pub mod location;
pub mod matcher;
pub mod recommender;
pub mod store;

#[cfg(test)]
pub mod testing;
