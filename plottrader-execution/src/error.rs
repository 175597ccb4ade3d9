use thiserror::Error;

/// Errors raised by symbol filters, exchange clients, and the symbol-info
/// cache. One enum for the whole crate, the way `barter_execution::error`
/// composes a single `ClientError` rather than one per submodule.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("order rejected by exchange filters: {0}")]
    FilterReject(String),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("venue request failed: {0}")]
    Venue(#[from] reqwest::Error),

    #[error("unsupported order type: {0}")]
    UnsupportedOrderType(String),

    #[error("unsupported client: {0}")]
    UnsupportedClient(String),

    #[error("snapshot io error: {0}")]
    Snapshot(#[from] std::io::Error),

    #[error("malformed client payload: {0}")]
    Malformed(String),
}
