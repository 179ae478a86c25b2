//! In-memory [`SnapshotStore`] and [`TrackCatalog`] for tests and local tooling.
//!
//! Snapshots live in a `BTreeMap` keyed by `(region, date)` so range scans come out date-ordered.
//! The store can be flipped into an unavailable mode to exercise failure paths, and it counts
//! reads so callers can check that a query was rejected before touching storage.

use super::{SnapshotStore, TrackCatalog};
use crate::domain::chart::{ChartSnapshot, DatedRow, SnapshotRow};
use crate::domain::region::Region;
use crate::domain::track::{TrackMetadata, TrackSummary};
use anyhow::{anyhow, bail};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryChartStore {
    snapshots: RwLock<BTreeMap<(Region, NaiveDate), ChartSnapshot>>,
    tracks: RwLock<HashMap<String, TrackMetadata>>,
    unavailable: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryChartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any snapshot already stored for the same region and day.
    pub fn insert_snapshot(&self, snapshot: ChartSnapshot) -> anyhow::Result<()> {
        let key = (snapshot.region().clone(), snapshot.date());
        self.snapshots
            .write()
            .map_err(|_| anyhow!("snapshot map lock poisoned"))?
            .insert(key, snapshot);
        Ok(())
    }

    pub fn insert_rows(
        &self,
        region: &Region,
        date: NaiveDate,
        rows: Vec<SnapshotRow>,
    ) -> anyhow::Result<()> {
        self.insert_snapshot(ChartSnapshot::try_new(region.clone(), date, rows)?)
    }

    pub fn insert_track(&self, track: TrackMetadata) -> anyhow::Result<()> {
        self.tracks
            .write()
            .map_err(|_| anyhow!("track map lock poisoned"))?
            .insert(track.id.clone(), track);
        Ok(())
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of trait reads served (or refused) so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn begin_read(&self) -> anyhow::Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("in-memory chart store is marked unavailable");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotStore for InMemoryChartStore {
    async fn fetch_snapshot(
        &self,
        region: &Region,
        date: NaiveDate,
    ) -> anyhow::Result<Option<ChartSnapshot>> {
        self.begin_read()?;
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| anyhow!("snapshot map lock poisoned"))?;
        Ok(snapshots.get(&(region.clone(), date)).cloned())
    }

    async fn fetch_track_rows(
        &self,
        region: &Region,
        track_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<DatedRow>> {
        self.begin_read()?;
        if start > end {
            return Ok(Vec::new());
        }
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| anyhow!("snapshot map lock poisoned"))?;

        let out = snapshots
            .range((region.clone(), start)..=(region.clone(), end))
            .filter_map(|((_, date), snapshot)| {
                snapshot
                    .rows()
                    .iter()
                    .find(|row| row.track_id == track_id)
                    .map(|row| DatedRow {
                        date: *date,
                        rank: row.rank,
                        stream_count: row.stream_count,
                    })
            })
            .collect();
        Ok(out)
    }

    async fn list_regions(&self) -> anyhow::Result<Vec<Region>> {
        self.begin_read()?;
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| anyhow!("snapshot map lock poisoned"))?;

        let mut out: Vec<Region> = Vec::new();
        for (region, _) in snapshots.keys() {
            if out.last() != Some(region) {
                out.push(region.clone());
            }
        }
        Ok(out)
    }

    async fn chart_date_bounds(
        &self,
        region: &Region,
    ) -> anyhow::Result<Option<(NaiveDate, NaiveDate)>> {
        self.begin_read()?;
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| anyhow!("snapshot map lock poisoned"))?;

        let mut dates = snapshots
            .keys()
            .filter(|(r, _)| r == region)
            .map(|(_, date)| *date);
        let Some(first) = dates.next() else {
            return Ok(None);
        };
        let last = dates.last().unwrap_or(first);
        Ok(Some((first, last)))
    }
}

#[async_trait::async_trait]
impl TrackCatalog for InMemoryChartStore {
    async fn fetch_summaries(
        &self,
        ids: &[String],
    ) -> anyhow::Result<HashMap<String, TrackSummary>> {
        self.begin_read()?;
        let tracks = self
            .tracks
            .read()
            .map_err(|_| anyhow!("track map lock poisoned"))?;

        Ok(ids
            .iter()
            .filter_map(|id| tracks.get(id))
            .map(|track| (track.id.clone(), track.summary()))
            .collect())
    }

    async fn fetch_metadata(&self, id: &str) -> anyhow::Result<Option<TrackMetadata>> {
        self.begin_read()?;
        let tracks = self
            .tracks
            .read()
            .map_err(|_| anyhow!("track map lock poisoned"))?;
        Ok(tracks.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    fn row(track_id: &str, rank: i32) -> SnapshotRow {
        SnapshotRow {
            track_id: track_id.to_string(),
            rank,
            stream_count: 10_000,
        }
    }

    #[tokio::test]
    async fn track_rows_are_scoped_to_region_and_range() {
        let store = InMemoryChartStore::new();
        let global = Region::global();
        let at = Region::parse("at").unwrap();
        store.insert_rows(&global, d(1), vec![row("t1", 5)]).unwrap();
        store.insert_rows(&global, d(2), vec![row("t2", 1)]).unwrap();
        store.insert_rows(&global, d(3), vec![row("t1", 3)]).unwrap();
        store.insert_rows(&global, d(9), vec![row("t1", 1)]).unwrap();
        store.insert_rows(&at, d(2), vec![row("t1", 1)]).unwrap();

        let rows = store.fetch_track_rows(&global, "t1", d(1), d(5)).await.unwrap();
        let got: Vec<_> = rows.iter().map(|r| (r.date, r.rank)).collect();
        assert_eq!(got, vec![(d(1), 5), (d(3), 3)]);
    }

    #[tokio::test]
    async fn regions_and_bounds() {
        let store = InMemoryChartStore::new();
        let global = Region::global();
        let at = Region::parse("at").unwrap();
        store.insert_rows(&global, d(4), vec![row("t1", 1)]).unwrap();
        store.insert_rows(&global, d(2), vec![row("t1", 1)]).unwrap();
        store.insert_rows(&at, d(3), vec![row("t1", 1)]).unwrap();

        assert_eq!(store.list_regions().await.unwrap(), vec![at.clone(), global.clone()]);
        assert_eq!(store.chart_date_bounds(&global).await.unwrap(), Some((d(2), d(4))));
        assert_eq!(store.chart_date_bounds(&at).await.unwrap(), Some((d(3), d(3))));
        let us = Region::parse("us").unwrap();
        assert_eq!(store.chart_date_bounds(&us).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unavailable_mode_fails_reads_and_counts_them() {
        let store = InMemoryChartStore::new();
        store.set_unavailable(true);
        assert!(store.fetch_snapshot(&Region::global(), d(1)).await.is_err());
        assert!(store.list_regions().await.is_err());
        assert_eq!(store.read_count(), 2);

        store.set_unavailable(false);
        assert!(store.fetch_snapshot(&Region::global(), d(1)).await.unwrap().is_none());
    }
}
