use chrono::NaiveDate;

/// Failure of a chart query. A query either succeeds completely or fails with exactly one of these.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("date range spans {days} days (max {max})")]
    RangeTooLong { days: i64, max: i64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("snapshot store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
}

impl ChartError {
    pub fn no_chart(region: &str, date: NaiveDate) -> Self {
        Self::NotFound(format!("no chart published for region={region} date={date}"))
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Only infrastructure failures are worth retrying; everything else fails the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
