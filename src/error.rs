//! Common error types for redink

use thiserror::Error;

use crate::services::generator::GenerationError;

/// Common result type for redink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the feedback service
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Feedback generation failed (background tasks only; logged, never
    /// returned to a submitter)
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
