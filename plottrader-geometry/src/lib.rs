//! Composable price-over-time curves ("plots") and the interval-alignment
//! helpers used to peg orders to them on a fixed cadence.

mod error;
mod interval;
mod json;
mod line;
mod plot;
mod point;

pub use error::GeometryError;
pub use interval::{interval_start, next_interval_start, parse_duration};
pub use json::{from_str, parse_plot, plot_to_value, to_string};
pub use line::{Line, LogLine};
pub use plot::Plot;
pub use point::{Point, time_to_f64};
