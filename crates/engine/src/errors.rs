//! Error types for the valuation and depreciation engines

use autovalue_forest::ForestError;
use thiserror::Error;

/// Errors surfaced to callers of the engines.
///
/// Unseen categorical values are not represented here: the encoders resolve
/// them to the fallback code.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Prediction requested before the valuation engine was trained
    #[error("valuation engine is not ready: training has not completed")]
    NotReady,

    /// Structurally malformed request
    #[error("invalid input: {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Training corpus is empty or contains malformed rows
    #[error("invalid training corpus: {0}")]
    InvalidCorpus(String),

    /// Model fitting failed
    #[error("training failed: {0}")]
    Training(#[from] ForestError),
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
