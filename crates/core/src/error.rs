use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown rule action type: {0}")]
    InvalidActionType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
