use crate::config::QueryLimits;
use crate::domain::chart::{DatedRow, TrackSeries, TrackSeriesPoint};
use crate::error::ChartError;
use crate::time::{date_axis, days_in_range};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Checks a comparison window and returns its dense day axis.
pub fn comparison_axis(
    start: NaiveDate,
    end: NaiveDate,
    limits: &QueryLimits,
) -> Result<Vec<NaiveDate>, ChartError> {
    if start > end {
        return Err(ChartError::InvalidRange { start, end });
    }
    let days = days_in_range(start, end);
    if days > limits.max_series_days {
        return Err(ChartError::RangeTooLong {
            days,
            max: limits.max_series_days,
        });
    }
    Ok(date_axis(start, end))
}

/// Trims ids and drops repeats, keeping first-occurrence order.
pub fn normalize_track_ids(
    track_ids: &[String],
    limits: &QueryLimits,
) -> Result<Vec<String>, ChartError> {
    if track_ids.is_empty() {
        return Err(ChartError::invalid_argument("track_ids must be non-empty"));
    }

    let mut seen = HashSet::with_capacity(track_ids.len());
    let mut out = Vec::with_capacity(track_ids.len());
    for raw in track_ids {
        let id = raw.trim();
        if id.is_empty() {
            return Err(ChartError::invalid_argument("track id must be non-empty"));
        }
        if seen.insert(id) {
            out.push(id.to_string());
        }
    }

    if out.len() > limits.max_compare_tracks {
        return Err(ChartError::invalid_argument(format!(
            "at most {} tracks can be compared (got {})",
            limits.max_compare_tracks,
            out.len()
        )));
    }
    Ok(out)
}

/// Places a track's sparse chart rows onto `axis`.
///
/// Days without a row are `None`; gaps are never filled.
pub fn align_series(track_id: &str, axis: &[NaiveDate], rows: &[DatedRow]) -> TrackSeries {
    let rank_by_date: HashMap<NaiveDate, i32> = rows.iter().map(|r| (r.date, r.rank)).collect();

    TrackSeries {
        track_id: track_id.to_string(),
        points: axis
            .iter()
            .map(|date| TrackSeriesPoint {
                date: *date,
                rank: rank_by_date.get(date).copied(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    fn dated(day: u32, rank: i32) -> DatedRow {
        DatedRow {
            date: d(day),
            rank,
            stream_count: 1,
        }
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn gaps_stay_null() {
        let axis = date_axis(d(1), d(5));
        let series = align_series("t1", &axis, &[dated(1, 7), dated(2, 4), dated(5, 1)]);
        assert_eq!(series.track_id, "t1");
        assert_eq!(series.ranks(), vec![Some(7), Some(4), None, None, Some(1)]);
        let dates: Vec<_> = series.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, axis);
    }

    #[test]
    fn no_rows_is_all_null() {
        let axis = date_axis(d(1), d(3));
        let series = align_series("t3", &axis, &[]);
        assert_eq!(series.ranks(), vec![None, None, None]);
    }

    #[test]
    fn rows_outside_axis_are_ignored() {
        let axis = date_axis(d(2), d(3));
        let series = align_series("t1", &axis, &[dated(1, 9), dated(3, 2), dated(4, 1)]);
        assert_eq!(series.ranks(), vec![None, Some(2)]);
    }

    #[test]
    fn axis_rejects_reversed_and_overlong_ranges() {
        let limits = QueryLimits {
            max_series_days: 3,
            max_compare_tracks: 10,
        };
        assert!(matches!(
            comparison_axis(d(3), d(1), &limits),
            Err(ChartError::InvalidRange { .. })
        ));
        assert!(matches!(
            comparison_axis(d(1), d(4), &limits),
            Err(ChartError::RangeTooLong { days: 4, max: 3 })
        ));
        assert_eq!(comparison_axis(d(1), d(3), &limits).unwrap().len(), 3);
    }

    #[test]
    fn track_ids_are_trimmed_and_deduplicated() {
        let limits = QueryLimits::default();
        let out = normalize_track_ids(&ids(&["t2", " t1 ", "t2", "t1", "t3"]), &limits).unwrap();
        assert_eq!(out, ids(&["t2", "t1", "t3"]));
    }

    #[test]
    fn track_ids_reject_empty_and_blank() {
        let limits = QueryLimits::default();
        assert!(matches!(
            normalize_track_ids(&[], &limits),
            Err(ChartError::InvalidArgument(_))
        ));
        assert!(matches!(
            normalize_track_ids(&ids(&["t1", "  "]), &limits),
            Err(ChartError::InvalidArgument(_))
        ));
    }

    #[test]
    fn track_id_limit_counts_distinct_ids() {
        let limits = QueryLimits {
            max_series_days: 10,
            max_compare_tracks: 2,
        };
        assert!(normalize_track_ids(&ids(&["a", "b", "a", "b"]), &limits).is_ok());
        assert!(normalize_track_ids(&ids(&["a", "b", "c"]), &limits).is_err());
    }
}
