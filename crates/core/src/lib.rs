pub mod charts;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;
pub mod time;

pub use error::ChartError;
pub use service::ChartService;

pub mod config {
    use anyhow::Context;

    const DEFAULT_MAX_SERIES_DAYS: i64 = 1827;
    const DEFAULT_MAX_COMPARE_TRACKS: usize = 10;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub port: Option<u16>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }

    /// Upper bounds applied to comparison queries before the store is touched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QueryLimits {
        /// Longest calendar-day axis a comparison may request (inclusive day count).
        pub max_series_days: i64,

        /// Most distinct tracks a single comparison may overlay.
        pub max_compare_tracks: usize,
    }

    impl Default for QueryLimits {
        fn default() -> Self {
            Self {
                max_series_days: DEFAULT_MAX_SERIES_DAYS,
                max_compare_tracks: DEFAULT_MAX_COMPARE_TRACKS,
            }
        }
    }

    impl QueryLimits {
        pub fn from_env() -> Self {
            let mut out = Self::default();

            if let Ok(s) = std::env::var("CHARTS_MAX_SERIES_DAYS") {
                if let Ok(n) = s.parse::<i64>() {
                    if n >= 1 {
                        out.max_series_days = n;
                    }
                }
            }

            if let Ok(s) = std::env::var("CHARTS_MAX_COMPARE_TRACKS") {
                if let Ok(n) = s.parse::<usize>() {
                    if n >= 1 {
                        out.max_compare_tracks = n;
                    }
                }
            }

            out
        }
    }
}
