use thiserror::Error;

/// Errors raised by the session registry.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("duplicate session token: {0}")]
    DuplicateToken(String),
}
