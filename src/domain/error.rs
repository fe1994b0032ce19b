use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("order not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("backend problem: {0}")]
    Problem(String),

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
