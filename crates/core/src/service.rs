use crate::charts::{align_series, classify_entries, comparison_axis, normalize_track_ids};
use crate::config::QueryLimits;
use crate::domain::chart::{ChartEntry, DatedRow, TrackSeries, Trend};
use crate::domain::region::Region;
use crate::domain::track::{TrackMetadata, TrackSummary};
use crate::error::{ChartError, Result};
use crate::storage::{SnapshotStore, TrackCatalog};
use crate::time::previous_day;
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// A chart table row: the computed entry plus pass-through catalog fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChartEntry {
    pub rank: i32,
    pub streams: i64,
    pub trend: Trend,
    pub change: Option<u32>,
    pub track: TrackSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackChartData {
    pub id: String,
    pub name: String,
    pub chart_entries: Vec<Option<i32>>,
}

/// Comparison payload. Every `chart_entries` has the same length as `dates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPerformance {
    pub dates: Vec<NaiveDate>,
    pub track_chart_data: Vec<TrackChartData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartDateBounds {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

struct ComparisonPlan {
    region: Region,
    axis: Vec<NaiveDate>,
    track_ids: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
}

/// Read-only chart queries over a snapshot store and a track catalog.
///
/// Holds no per-request state; clone it freely into request handlers.
#[derive(Clone)]
pub struct ChartService {
    snapshots: Arc<dyn SnapshotStore>,
    catalog: Arc<dyn TrackCatalog>,
    limits: QueryLimits,
}

impl ChartService {
    pub fn new(
        snapshots: Arc<dyn SnapshotStore>,
        catalog: Arc<dyn TrackCatalog>,
        limits: QueryLimits,
    ) -> Self {
        Self {
            snapshots,
            catalog,
            limits,
        }
    }

    /// Uses one backend as both snapshot store and catalog.
    pub fn from_store<S>(store: Arc<S>, limits: QueryLimits) -> Self
    where
        S: SnapshotStore + TrackCatalog + 'static,
    {
        Self::new(store.clone(), store, limits)
    }

    /// Ranked entries for `region` on `date`, annotated against the previous calendar day.
    pub async fn build_daily_chart(
        &self,
        region: &str,
        date: NaiveDate,
    ) -> Result<Vec<ChartEntry>> {
        let region = Region::parse(region)?;
        let t0 = Instant::now();

        let (current, previous) = tokio::try_join!(
            self.snapshots.fetch_snapshot(&region, date),
            async {
                match previous_day(date) {
                    Some(prev) => self.snapshots.fetch_snapshot(&region, prev).await,
                    None => Ok(None),
                }
            }
        )
        .map_err(ChartError::StoreUnavailable)?;

        let current = current.ok_or_else(|| ChartError::no_chart(region.as_str(), date))?;
        let entries = classify_entries(&current, previous.as_ref());

        tracing::debug!(
            region = %region,
            %date,
            entries_len = entries.len(),
            has_previous = previous.is_some(),
            elapsed_ms = t0.elapsed().as_millis(),
            "built daily chart"
        );
        Ok(entries)
    }

    /// One aligned series per distinct requested track, in request order.
    pub async fn build_comparison_series(
        &self,
        region: &str,
        track_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TrackSeries>> {
        let plan = self.plan_comparison(region, track_ids, start, end)?;
        let rows = self.fetch_track_rows(&plan).await?;
        Ok(align_all(&plan, &rows))
    }

    pub async fn get_daily_charts(
        &self,
        region: &str,
        date: NaiveDate,
    ) -> Result<Vec<DailyChartEntry>> {
        let entries = self.build_daily_chart(region, date).await?;

        let ids: Vec<String> = entries.iter().map(|e| e.track_id.clone()).collect();
        let mut summaries = self
            .catalog
            .fetch_summaries(&ids)
            .await
            .context("fetch track summaries failed")
            .map_err(ChartError::StoreUnavailable)?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let track = take_summary(&mut summaries, &entry.track_id);
                DailyChartEntry {
                    rank: entry.rank,
                    streams: entry.stream_count,
                    trend: entry.trend,
                    change: entry.change,
                    track,
                }
            })
            .collect())
    }

    pub async fn get_chart_performance_of_tracks(
        &self,
        region: &str,
        track_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ChartPerformance> {
        let plan = self.plan_comparison(region, track_ids, start, end)?;
        let t0 = Instant::now();

        let (rows, mut summaries) = tokio::try_join!(self.fetch_track_rows(&plan), async {
            self.catalog
                .fetch_summaries(&plan.track_ids)
                .await
                .context("fetch track summaries failed")
                .map_err(ChartError::StoreUnavailable)
        })?;

        let track_chart_data = align_all(&plan, &rows)
            .into_iter()
            .map(|series| {
                let name = take_summary(&mut summaries, &series.track_id).name;
                TrackChartData {
                    chart_entries: series.ranks(),
                    id: series.track_id,
                    name,
                }
            })
            .collect();

        tracing::debug!(
            region = %plan.region,
            start = %plan.start,
            end = %plan.end,
            tracks_len = plan.track_ids.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "built chart performance"
        );

        Ok(ChartPerformance {
            dates: plan.axis,
            track_chart_data,
        })
    }

    pub async fn list_regions(&self) -> Result<Vec<Region>> {
        self.snapshots
            .list_regions()
            .await
            .map_err(ChartError::StoreUnavailable)
    }

    pub async fn chart_date_bounds(&self, region: &str) -> Result<ChartDateBounds> {
        let region = Region::parse(region)?;
        let (first, last) = self
            .snapshots
            .chart_date_bounds(&region)
            .await
            .map_err(ChartError::StoreUnavailable)?
            .ok_or_else(|| {
                ChartError::NotFound(format!("no charts published for region={region}"))
            })?;
        Ok(ChartDateBounds { first, last })
    }

    pub async fn get_track_metadata(&self, track_id: &str) -> Result<TrackMetadata> {
        let track_id = track_id.trim();
        if track_id.is_empty() {
            return Err(ChartError::invalid_argument("track id must be non-empty"));
        }
        self.catalog
            .fetch_metadata(track_id)
            .await
            .map_err(ChartError::StoreUnavailable)?
            .ok_or_else(|| ChartError::NotFound(format!("unknown track id={track_id}")))
    }

    // Everything a comparison can reject is checked here, before any store read.
    fn plan_comparison(
        &self,
        region: &str,
        track_ids: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ComparisonPlan> {
        let region = Region::parse(region)?;
        let axis = comparison_axis(start, end, &self.limits)?;
        let track_ids = normalize_track_ids(track_ids, &self.limits)?;
        Ok(ComparisonPlan {
            region,
            axis,
            track_ids,
            start,
            end,
        })
    }

    /// Issues one store read per track concurrently; results come back in `plan.track_ids` order.
    async fn fetch_track_rows(&self, plan: &ComparisonPlan) -> Result<Vec<Vec<DatedRow>>> {
        let mut tasks = JoinSet::new();
        for (idx, track_id) in plan.track_ids.iter().enumerate() {
            let store = Arc::clone(&self.snapshots);
            let region = plan.region.clone();
            let track_id = track_id.clone();
            let (start, end) = (plan.start, plan.end);
            tasks.spawn(async move {
                let rows = store
                    .fetch_track_rows(&region, &track_id, start, end)
                    .await
                    .with_context(|| format!("fetch chart rows failed (track_id={track_id})"))?;
                anyhow::Ok((idx, rows))
            });
        }

        let mut out = vec![Vec::new(); plan.track_ids.len()];
        while let Some(joined) = tasks.join_next().await {
            // Returning early drops the set, which aborts the reads still in flight.
            let (idx, rows) = joined
                .context("chart rows task did not complete")
                .and_then(|res| res)
                .map_err(ChartError::StoreUnavailable)?;
            out[idx] = rows;
        }
        Ok(out)
    }
}

fn align_all(plan: &ComparisonPlan, rows: &[Vec<DatedRow>]) -> Vec<TrackSeries> {
    plan.track_ids
        .iter()
        .zip(rows)
        .map(|(track_id, rows)| align_series(track_id, &plan.axis, rows))
        .collect()
}

fn take_summary(summaries: &mut HashMap<String, TrackSummary>, track_id: &str) -> TrackSummary {
    summaries.remove(track_id).unwrap_or_else(|| {
        tracing::warn!(track_id, "track missing from catalog; using id as name");
        TrackSummary::unknown(track_id)
    })
}
