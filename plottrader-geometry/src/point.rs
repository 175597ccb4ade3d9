use chrono::{DateTime, Utc};

/// A single (date, price) anchor used to build [`crate::plot::Plot::line`],
/// [`crate::plot::Plot::log_line`] and [`crate::plot::Plot::shape`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub date: DateTime<Utc>,
    pub price: f64,
}

impl Point {
    pub fn new(date: DateTime<Utc>, price: f64) -> Self {
        Self { date, price }
    }
}

/// Converts an instant to the float seconds-since-epoch domain the line
/// algebra operates in.
pub fn time_to_f64(t: DateTime<Utc>) -> f64 {
    t.timestamp() as f64 + t.timestamp_subsec_nanos() as f64 / 1_000_000_000.0
}
