use thiserror::Error;

/// Errors raised by the plot algebra (interval parsing, plot construction and evaluation).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The plot has no value at the queried instant. The only error `Plot::at` can return.
    #[error("out of range")]
    OutOfRange,

    #[error("line endpoints must have distinct dates")]
    EqualEndpoints,

    #[error("log_line endpoints require strictly positive prices")]
    NonPositivePrice,

    #[error("a shape requires at least 3 points, got {0}")]
    TooFewPoints(usize),

    #[error("min/max requires at least 1 child")]
    EmptyChildren,

    #[error("unknown plot type: {0}")]
    UnknownPlotTag(String),

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("malformed plot json: {0}")]
    Json(String),
}
