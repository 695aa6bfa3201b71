//! Location Adjuster: rescales a salary range by a location's cost-of-living index.

use serde::Serialize;

use crate::pricing::aggregator::SalaryRange;
use crate::pricing::error::PricingError;
use crate::pricing::store::BenchmarkRepository;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationAdjustment {
    pub location: String,
    pub cost_of_living_index: f64,
}

/// Resolves a location name, failing for names the index does not know.
pub fn resolve(
    repo: &dyn BenchmarkRepository,
    location: &str,
) -> Result<LocationAdjustment, PricingError> {
    let record = repo.location(location).ok_or_else(|| {
        PricingError::Validation(format!("Unknown location '{}'", location.trim()))
    })?;
    Ok(LocationAdjustment {
        location: record.name.clone(),
        cost_of_living_index: record.cost_of_living_index,
    })
}

/// Multiplies min/target/max by the location's index (1.0 = baseline).
pub fn adjust(
    repo: &dyn BenchmarkRepository,
    range: &SalaryRange,
    location: &str,
) -> Result<(SalaryRange, LocationAdjustment), PricingError> {
    let adjustment = resolve(repo, location)?;
    Ok((range.scaled(adjustment.cost_of_living_index), adjustment))
}
