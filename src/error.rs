//! Error types for the audit committee pipeline

use thiserror::Error;

/// Result type alias for committee operations
pub type Result<T> = std::result::Result<T, CommitteeError>;

#[derive(Error, Debug)]
pub enum CommitteeError {

    // =============================
    // Core Pipeline Errors
    // =============================

    /// The generation backend was unreachable, timed out, or returned
    /// output that does not conform to the requested shape.
    #[error("Generation failure: {0}")]
    GenerationFailure(String),

    /// A quality-gated stage exhausted its attempts without a single
    /// accepted candidate.
    #[error("Quality gate exhausted: {stage} produced no accepted result in {attempts} attempt(s)")]
    QualityGateExhausted { stage: &'static str, attempts: u32 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
