use crate::domain::chart::{ChartEntry, ChartSnapshot, Trend};
use std::collections::HashMap;

/// Trend and change for a track now at `rank` that held `previous_rank` the day before.
pub fn classify_trend(previous_rank: Option<i32>, rank: i32) -> (Trend, Option<u32>) {
    let Some(previous_rank) = previous_rank else {
        return (Trend::New, None);
    };

    // Positive delta means the track climbed toward #1.
    let delta = previous_rank - rank;
    let trend = match delta {
        d if d > 0 => Trend::Up,
        d if d < 0 => Trend::Down,
        _ => Trend::Same,
    };
    (trend, Some(delta.unsigned_abs()))
}

/// Annotates every row of `current` against the immediately preceding day's snapshot.
///
/// Without a previous snapshot every entry is `New`. Output keeps `current`'s rank order.
pub fn classify_entries(
    current: &ChartSnapshot,
    previous: Option<&ChartSnapshot>,
) -> Vec<ChartEntry> {
    let previous_ranks: HashMap<&str, i32> = previous
        .map(|snapshot| {
            snapshot
                .rows()
                .iter()
                .map(|row| (row.track_id.as_str(), row.rank))
                .collect()
        })
        .unwrap_or_default();

    current
        .rows()
        .iter()
        .map(|row| {
            let (trend, change) =
                classify_trend(previous_ranks.get(row.track_id.as_str()).copied(), row.rank);
            ChartEntry {
                track_id: row.track_id.clone(),
                rank: row.rank,
                stream_count: row.stream_count,
                trend,
                change,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::SnapshotRow;
    use crate::domain::region::Region;
    use chrono::NaiveDate;

    fn snapshot(day: u32, rows: &[(&str, i32)]) -> ChartSnapshot {
        let rows = rows
            .iter()
            .map(|(id, rank)| SnapshotRow {
                track_id: id.to_string(),
                rank: *rank,
                stream_count: 1_000_000 - i64::from(*rank),
            })
            .collect();
        ChartSnapshot::try_new(
            Region::global(),
            NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            rows,
        )
        .unwrap()
    }

    #[test]
    fn classify_trend_directions() {
        assert_eq!(classify_trend(Some(5), 3), (Trend::Up, Some(2)));
        assert_eq!(classify_trend(Some(3), 8), (Trend::Down, Some(5)));
        assert_eq!(classify_trend(Some(4), 4), (Trend::Same, Some(0)));
        assert_eq!(classify_trend(None, 1), (Trend::New, None));
    }

    #[test]
    fn joins_against_previous_day() {
        let prev = snapshot(1, &[("t1", 5), ("t3", 1), ("t4", 2), ("gone", 3)]);
        let cur = snapshot(2, &[("t3", 4), ("t1", 3), ("t2", 10), ("t4", 2)]);

        let entries = classify_entries(&cur, Some(&prev));
        let got: Vec<_> = entries
            .iter()
            .map(|e| (e.track_id.as_str(), e.rank, e.trend, e.change))
            .collect();
        assert_eq!(
            got,
            vec![
                ("t4", 2, Trend::Same, Some(0)),
                ("t1", 3, Trend::Up, Some(2)),
                ("t3", 4, Trend::Down, Some(3)),
                ("t2", 10, Trend::New, None),
            ]
        );
    }

    #[test]
    fn everything_is_new_without_previous_snapshot() {
        let cur = snapshot(2, &[("a", 1), ("b", 2)]);
        let entries = classify_entries(&cur, None);
        assert!(entries
            .iter()
            .all(|e| e.trend == Trend::New && e.change.is_none()));
    }

    #[test]
    fn output_matches_current_length_and_streams() {
        let rows: Vec<(String, i32)> = (1..=50).map(|r| (format!("t{r}"), r)).collect();
        let borrowed: Vec<(&str, i32)> = rows.iter().map(|(id, r)| (id.as_str(), *r)).collect();
        let cur = snapshot(2, &borrowed);
        let prev = snapshot(1, &borrowed[..25]);

        let entries = classify_entries(&cur, Some(&prev));
        assert_eq!(entries.len(), 50);
        assert!(entries.windows(2).all(|w| w[0].rank < w[1].rank));
        assert_eq!(entries[0].stream_count, 1_000_000 - 1);
        assert_eq!(entries.iter().filter(|e| e.trend == Trend::New).count(), 25);
        assert_eq!(entries.iter().filter(|e| e.trend == Trend::Same).count(), 25);
    }

    #[test]
    fn empty_current_snapshot_yields_no_entries() {
        let cur = snapshot(2, &[]);
        let prev = snapshot(1, &[("a", 1)]);
        assert!(classify_entries(&cur, Some(&prev)).is_empty());
    }
}
