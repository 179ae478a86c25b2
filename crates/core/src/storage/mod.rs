pub mod memory;
pub mod postgres;
pub mod snapshots;
pub mod tracks;

use crate::domain::chart::{ChartSnapshot, DatedRow};
use crate::domain::region::Region;
use crate::domain::track::{TrackMetadata, TrackSummary};
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashMap;

pub use memory::InMemoryChartStore;
pub use postgres::PgChartStore;

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Read access to published daily chart snapshots. Ingestion happens elsewhere.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn fetch_snapshot(
        &self,
        region: &Region,
        date: NaiveDate,
    ) -> anyhow::Result<Option<ChartSnapshot>>;

    /// Every chart appearance of `track_id` in `region` within `[start, end]`, ascending by date.
    async fn fetch_track_rows(
        &self,
        region: &Region,
        track_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<DatedRow>>;

    async fn list_regions(&self) -> anyhow::Result<Vec<Region>>;

    /// First and last day with a published snapshot.
    async fn chart_date_bounds(
        &self,
        region: &Region,
    ) -> anyhow::Result<Option<(NaiveDate, NaiveDate)>>;
}

#[async_trait::async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Summaries for the ids the catalog knows. Unknown ids are simply missing from the map.
    async fn fetch_summaries(
        &self,
        ids: &[String],
    ) -> anyhow::Result<HashMap<String, TrackSummary>>;

    async fn fetch_metadata(&self, id: &str) -> anyhow::Result<Option<TrackMetadata>>;
}
