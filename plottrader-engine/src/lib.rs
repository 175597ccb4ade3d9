#![forbid(unsafe_code)]
#![warn(clippy::all, rust_2018_idioms, unreachable_pub)]

//! The plot-order lifecycle engine: a per-order tick loop re-pegging a
//! resting exchange order to a plot's value on a fixed cadence, and a
//! registry supervising every plot order for one exchange client.

mod error;
mod order;
mod orderer;
#[cfg(test)]
mod tests;

pub use error::EngineError;
pub use order::{Handler, PlotOrder, PlotOrderState, PlotOrderSummary, TickOutcome};
pub use orderer::{DynPlotOrderer, PlotOrderer};
