pub mod calendar;

pub use calendar::{date_axis, days_in_range, parse_calendar_date, previous_day};
