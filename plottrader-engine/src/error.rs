use plottrader_execution::ExecutionError;
use thiserror::Error;

/// Errors raised by the plot-order tick loop and the plot-orderer registry.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("plot has no value at the current instant")]
    OutOfRange,

    #[error("plot order not found: {0}")]
    NotFound(String),

    #[error("plot order already stopped")]
    AlreadyStopped,

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
