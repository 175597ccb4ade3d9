use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use plottrader_engine::EngineError;
use plottrader_execution::ExecutionError;
use plottrader_session::SessionError;

/// Every error this process can surface over HTTP, flattened to one type so
/// handlers can use `?` regardless of which crate raised the underlying
/// error. Client-origin variants map to 400, everything else to 500.
#[derive(Debug)]
pub enum AppError {
    Session(SessionError),
    Engine(EngineError),
    Execution(ExecutionError),
    UnsupportedClient(String),
    BadRequest(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

impl From<ExecutionError> for AppError {
    fn from(e: ExecutionError) -> Self {
        AppError::Execution(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Session(SessionError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("session: not found: {id}"))
            }
            AppError::Session(e) => (StatusCode::BAD_REQUEST, format!("session: {e}")),
            AppError::Engine(EngineError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("engine: not found: {id}"))
            }
            AppError::Engine(e @ (EngineError::OutOfRange | EngineError::AlreadyStopped)) => {
                (StatusCode::BAD_REQUEST, format!("engine: {e}"))
            }
            AppError::Engine(EngineError::Execution(e)) => execution_status(e),
            AppError::Execution(e) => execution_status(e),
            AppError::UnsupportedClient(id) => {
                (StatusCode::BAD_REQUEST, format!("unsupported client: {id}"))
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

fn execution_status(e: &ExecutionError) -> (StatusCode, String) {
    match e {
        ExecutionError::FilterReject(_) | ExecutionError::UnsupportedOrderType(_) | ExecutionError::Malformed(_) => {
            (StatusCode::BAD_REQUEST, format!("execution: {e}"))
        }
        ExecutionError::UnknownSymbol(_) => (StatusCode::NOT_FOUND, format!("execution: {e}")),
        ExecutionError::UnsupportedClient(_) => (StatusCode::BAD_REQUEST, format!("execution: {e}")),
        ExecutionError::Venue(_) | ExecutionError::Snapshot(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("execution: {e}"))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
