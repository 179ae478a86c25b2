//! Pure chart transformations. Store access and concurrency live in [`crate::service`].

pub mod daily;
pub mod series;

pub use daily::{classify_entries, classify_trend};
pub use series::{align_series, comparison_axis, normalize_track_ids};
