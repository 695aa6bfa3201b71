//! Read-only benchmark data: jobs, market pay records, and locations.
//!
//! A `BenchmarkSnapshot` is immutable once built. `BenchmarkStore` swaps whole
//! snapshots, so a request that took a snapshot keeps a consistent view while a
//! reload runs.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::models::benchmark::BenchmarkJob;
use crate::models::location::LocationRecord;
use crate::models::market::MarketDataRecord;

/// Narrow read interface consumed by the matcher, aggregator, and adjuster.
pub trait BenchmarkRepository: Send + Sync {
    fn benchmark_jobs(&self) -> &[BenchmarkJob];
    fn market_data(&self, job_code: &str) -> Option<&MarketDataRecord>;
    /// Case-insensitive, whitespace-trimmed lookup.
    fn location(&self, name: &str) -> Option<&LocationRecord>;
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SnapshotCounts {
    pub jobs: usize,
    pub market_records: usize,
    pub locations: usize,
}

#[derive(Debug, Default)]
pub struct BenchmarkSnapshot {
    jobs: Vec<BenchmarkJob>,
    market_data: HashMap<String, MarketDataRecord>,
    locations: HashMap<String, LocationRecord>,
}

impl BenchmarkSnapshot {
    /// Builds a snapshot. Jobs are ordered by `job_code`; a later duplicate
    /// job, market record, or location replaces an earlier one.
    pub fn new(
        jobs: Vec<BenchmarkJob>,
        market_data: Vec<MarketDataRecord>,
        locations: Vec<LocationRecord>,
    ) -> Self {
        let mut by_code: HashMap<String, BenchmarkJob> = HashMap::with_capacity(jobs.len());
        for job in jobs {
            by_code.insert(job.job_code.clone(), job);
        }
        let mut jobs: Vec<BenchmarkJob> = by_code.into_values().collect();
        jobs.sort_by(|a, b| a.job_code.cmp(&b.job_code));

        Self {
            jobs,
            market_data: market_data
                .into_iter()
                .map(|record| (record.job_code.clone(), record))
                .collect(),
            locations: locations
                .into_iter()
                .map(|location| (LocationRecord::key(&location.name), location))
                .collect(),
        }
    }

    pub fn counts(&self) -> SnapshotCounts {
        SnapshotCounts {
            jobs: self.jobs.len(),
            market_records: self.market_data.len(),
            locations: self.locations.len(),
        }
    }

    /// All locations sorted by name.
    pub fn locations(&self) -> Vec<&LocationRecord> {
        let mut all: Vec<&LocationRecord> = self.locations.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

impl BenchmarkRepository for BenchmarkSnapshot {
    fn benchmark_jobs(&self) -> &[BenchmarkJob] {
        &self.jobs
    }

    fn market_data(&self, job_code: &str) -> Option<&MarketDataRecord> {
        self.market_data.get(job_code)
    }

    fn location(&self, name: &str) -> Option<&LocationRecord> {
        self.locations.get(&LocationRecord::key(name))
    }
}

/// Holds the current snapshot behind an atomic pointer swap.
#[derive(Debug, Default)]
pub struct BenchmarkStore {
    current: RwLock<Arc<BenchmarkSnapshot>>,
}

impl BenchmarkStore {
    pub fn new(snapshot: BenchmarkSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot to use for one request. The lock is held only for the clone.
    pub fn snapshot(&self) -> Arc<BenchmarkSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Installs a new snapshot; in-flight requests keep the one they took.
    pub fn replace(&self, snapshot: BenchmarkSnapshot) -> SnapshotCounts {
        let counts = snapshot.counts();
        *self.current.write() = Arc::new(snapshot);
        counts
    }
}
