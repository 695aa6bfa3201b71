use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{require_text, RecordError};

#[derive(Debug, Clone, FromRow)]
pub struct LocationRow {
    pub name: String,
    pub cost_of_living_index: f64,
}

/// A named work location and its cost-of-living multiplier (1.0 = baseline).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    pub name: String,
    pub cost_of_living_index: f64,
}

impl LocationRecord {
    pub fn new(name: impl Into<String>, cost_of_living_index: f64) -> Result<Self, RecordError> {
        if !(cost_of_living_index.is_finite() && cost_of_living_index > 0.0) {
            return Err(RecordError::NotPositive {
                field: "cost_of_living_index",
                value: cost_of_living_index,
            });
        }
        Ok(Self {
            name: require_text("name", name.into())?,
            cost_of_living_index,
        })
    }

    /// Lookup key: trimmed and lowercased.
    pub fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

impl TryFrom<LocationRow> for LocationRecord {
    type Error = RecordError;

    fn try_from(row: LocationRow) -> Result<Self, Self::Error> {
        LocationRecord::new(row.name, row.cost_of_living_index)
    }
}
