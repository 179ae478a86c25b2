use crate::error::ChartError;
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

// Chart days are plain calendar dates. Accepting timestamps here would let the caller's
// timezone shift a query onto the neighbouring day, so anything but YYYY-MM-DD is rejected.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate, ChartError> {
    let s = s.trim();
    if s.len() != 10 {
        return Err(ChartError::invalid_argument(format!(
            "date must be YYYY-MM-DD (got {s:?})"
        )));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| ChartError::invalid_argument(format!("invalid date {s:?}: {e}")))
}

pub fn previous_day(date: NaiveDate) -> Option<NaiveDate> {
    date.pred_opt()
}

/// Number of calendar days in `[start, end]`, both ends included. Zero when `start > end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return 0;
    }
    (end - start).num_days() + 1
}

/// Dense ascending list of every calendar day in `[start, end]`.
pub fn date_axis(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let len = days_in_range(start, end);
    let mut out = Vec::with_capacity(len as usize);
    let mut next = Some(start);
    while let Some(day) = next.filter(|day| *day <= end) {
        out.push(day);
        next = day.succ_opt();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_plain_calendar_dates() {
        assert_eq!(parse_calendar_date("2021-01-02").unwrap(), d(2021, 1, 2));
        assert_eq!(parse_calendar_date(" 2020-02-29 ").unwrap(), d(2020, 2, 29));
    }

    #[test]
    fn rejects_timestamps_and_garbage() {
        for s in [
            "2021-01-02T00:00:00Z",
            "2021-01-02 23:00",
            "2021-1-2",
            "2021-02-30",
            "",
            "yesterday",
        ] {
            let err = parse_calendar_date(s).unwrap_err();
            assert!(matches!(err, ChartError::InvalidArgument(_)), "{s}");
        }
    }

    #[test]
    fn axis_is_dense_and_inclusive() {
        let axis = date_axis(d(2020, 2, 27), d(2020, 3, 1));
        assert_eq!(
            axis,
            vec![d(2020, 2, 27), d(2020, 2, 28), d(2020, 2, 29), d(2020, 3, 1)]
        );
        assert_eq!(days_in_range(d(2020, 2, 27), d(2020, 3, 1)), 4);
    }

    #[test]
    fn single_day_axis() {
        assert_eq!(date_axis(d(2021, 1, 1), d(2021, 1, 1)), vec![d(2021, 1, 1)]);
        assert_eq!(days_in_range(d(2021, 1, 1), d(2021, 1, 1)), 1);
    }

    #[test]
    fn reversed_range_is_empty() {
        assert!(date_axis(d(2021, 1, 3), d(2021, 1, 1)).is_empty());
        assert_eq!(days_in_range(d(2021, 1, 3), d(2021, 1, 1)), 0);
    }

    #[test]
    fn previous_day_crosses_year_boundary() {
        assert_eq!(previous_day(d(2021, 1, 1)), Some(d(2020, 12, 31)));
        assert_eq!(previous_day(NaiveDate::MIN), None);
    }
}
