use super::{snapshots, tracks, SnapshotStore, TrackCatalog};
use crate::domain::chart::{ChartSnapshot, DatedRow};
use crate::domain::region::Region;
use crate::domain::track::{TrackMetadata, TrackSummary};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Snapshot store and track catalog backed by the Postgres schema in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgChartStore {
    pool: sqlx::PgPool,
}

impl PgChartStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for PgChartStore {
    async fn fetch_snapshot(
        &self,
        region: &Region,
        date: NaiveDate,
    ) -> anyhow::Result<Option<ChartSnapshot>> {
        snapshots::fetch_snapshot(&self.pool, region, date).await
    }

    async fn fetch_track_rows(
        &self,
        region: &Region,
        track_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<DatedRow>> {
        snapshots::fetch_track_rows(&self.pool, region, track_id, start, end).await
    }

    async fn list_regions(&self) -> anyhow::Result<Vec<Region>> {
        snapshots::list_regions(&self.pool).await
    }

    async fn chart_date_bounds(
        &self,
        region: &Region,
    ) -> anyhow::Result<Option<(NaiveDate, NaiveDate)>> {
        snapshots::chart_date_bounds(&self.pool, region).await
    }
}

#[async_trait::async_trait]
impl TrackCatalog for PgChartStore {
    async fn fetch_summaries(
        &self,
        ids: &[String],
    ) -> anyhow::Result<HashMap<String, TrackSummary>> {
        tracks::fetch_summaries(&self.pool, ids).await
    }

    async fn fetch_metadata(&self, id: &str) -> anyhow::Result<Option<TrackMetadata>> {
        tracks::fetch_metadata(&self.pool, id).await
    }
}
