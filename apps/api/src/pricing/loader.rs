use anyhow::Result;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::models::benchmark::{BenchmarkJob, BenchmarkJobRow};
use crate::models::location::{LocationRecord, LocationRow};
use crate::models::market::{MarketDataRecord, MarketDataRow};
use crate::models::RecordError;
use crate::pricing::store::BenchmarkSnapshot;

/// Reads the benchmark library, market data, and location index into a new
/// snapshot. Rows that break a record invariant are skipped, not loaded.
pub async fn load_snapshot(pool: &PgPool) -> Result<BenchmarkSnapshot> {
    let job_rows = sqlx::query_as::<_, BenchmarkJobRow>(
        r#"
        SELECT job_code, title, family, subfamily, career_level, description, embedding
        FROM benchmark_jobs
        ORDER BY job_code
        "#,
    )
    .fetch_all(pool)
    .await?;

    let market_rows = sqlx::query_as::<_, MarketDataRow>(
        r#"
        SELECT job_code, p25, p50, p75, currency, survey_name, survey_date, sample_size
        FROM market_data
        ORDER BY job_code, survey_date NULLS FIRST
        "#,
    )
    .fetch_all(pool)
    .await?;

    let location_rows = sqlx::query_as::<_, LocationRow>(
        "SELECT name, cost_of_living_index FROM locations ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let jobs = convert_rows(
        job_rows,
        "benchmark job",
        |r| r.job_code.clone(),
        BenchmarkJob::try_from,
    );
    // Ordered oldest survey first, so the newest record per job wins.
    let market = convert_rows(
        market_rows,
        "market data",
        |r| r.job_code.clone(),
        MarketDataRecord::try_from,
    );
    let locations = convert_rows(
        location_rows,
        "location",
        |r| r.name.clone(),
        LocationRecord::try_from,
    );

    let snapshot = BenchmarkSnapshot::new(jobs, market, locations);
    let counts = snapshot.counts();
    info!(
        jobs = counts.jobs,
        market_records = counts.market_records,
        locations = counts.locations,
        "benchmark snapshot loaded"
    );
    Ok(snapshot)
}

fn convert_rows<R, T>(
    rows: Vec<R>,
    kind: &str,
    key: impl Fn(&R) -> String,
    convert: impl Fn(R) -> Result<T, RecordError>,
) -> Vec<T> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let id = key(&row);
        match convert(row) {
            Ok(record) => out.push(record),
            Err(e) => warn!("skipping {kind} row '{id}': {e}"),
        }
    }
    out
}
