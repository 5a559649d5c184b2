//! Errors surfaced by a rule pass.

use std::time::Duration;

use rulehook_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("run cancelled")]
    Cancelled,
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
