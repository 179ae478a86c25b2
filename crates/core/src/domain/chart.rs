use crate::domain::region::Region;
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MAX_CHART_RANK: i32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
    pub track_id: String,
    pub rank: i32,
    pub stream_count: i64,
}

/// One region's Top-50 for one calendar day. Rows are ordered by rank ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    region: Region,
    date: NaiveDate,
    rows: Vec<SnapshotRow>,
}

impl ChartSnapshot {
    pub fn try_new(
        region: Region,
        date: NaiveDate,
        mut rows: Vec<SnapshotRow>,
    ) -> anyhow::Result<Self> {
        ensure!(
            rows.len() <= MAX_CHART_RANK as usize,
            "snapshot {region}/{date} has {} rows (max {MAX_CHART_RANK})",
            rows.len()
        );

        let mut seen_ranks = BTreeSet::<i32>::new();
        let mut seen_tracks = BTreeSet::<&str>::new();
        for row in &rows {
            ensure!(
                (1..=MAX_CHART_RANK).contains(&row.rank),
                "snapshot {region}/{date}: rank out of range: {}",
                row.rank
            );
            ensure!(
                seen_ranks.insert(row.rank),
                "snapshot {region}/{date}: duplicate rank: {}",
                row.rank
            );
            ensure!(
                !row.track_id.trim().is_empty(),
                "snapshot {region}/{date}: track_id must be non-empty"
            );
            ensure!(
                seen_tracks.insert(row.track_id.as_str()),
                "snapshot {region}/{date}: duplicate track_id: {}",
                row.track_id
            );
            ensure!(
                row.stream_count >= 0,
                "snapshot {region}/{date}: negative stream count for {}",
                row.track_id
            );
        }

        rows.sort_by_key(|row| row.rank);
        Ok(Self { region, date, rows })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn rows(&self) -> &[SnapshotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A snapshot row for one track, tagged with the chart day it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedRow {
    pub date: NaiveDate,
    pub rank: i32,
    pub stream_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Same,
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    pub track_id: String,
    pub rank: i32,
    pub stream_count: i64,
    pub trend: Trend,
    /// Magnitude of the move since the previous day. `None` iff `trend` is `New`.
    pub change: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSeriesPoint {
    pub date: NaiveDate,
    /// `None` means the track was not in that day's Top 50.
    pub rank: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSeries {
    pub track_id: String,
    pub points: Vec<TrackSeriesPoint>,
}

impl TrackSeries {
    pub fn ranks(&self) -> Vec<Option<i32>> {
        self.points.iter().map(|p| p.rank).collect()
    }
}
