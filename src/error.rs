//! Error types for the det-eval library.

use thiserror::Error;

/// Result type for det-eval operations.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Error types that can occur while loading inputs or configuring an evaluation.
///
/// The metric functions themselves never fail: empty inputs and degenerate
/// boxes fall back to `0.0`.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid bounding box coordinates.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// A detection record that cannot be evaluated.
    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    /// Invalid confidence or IoU threshold.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Invalid evaluation configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
