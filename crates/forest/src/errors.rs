use thiserror::Error;

/// Errors returned by the forest trainer and model.
#[derive(Debug, Error)]
pub enum ForestError {
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("dataset shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid forest configuration: {0}")]
    InvalidConfig(String),

    #[error("model validation failed: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for forest operations
pub type Result<T> = std::result::Result<T, ForestError>;
