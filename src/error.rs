//! Error types for the transport frames service
//!
//! Defines one error enum covering all failure modes across the system.
//! Uses thiserror for ergonomic error handling.
//!
//! Required-input failures (`NotFound`, `Validation`, `MissingRequiredInput`)
//! always abort the request that raised them. Optional-input failures
//! (`Upstream` on a POI category fetch) are absorbed into an empty dataset
//! before they reach the request path. Background recompute failures are
//! logged and never surfaced to any caller.

use thiserror::Error;

/// Result type alias for transport frames operations
pub type Result<T> = std::result::Result<T, TransportFramesError>;

/// Comprehensive error type for transport frames operations
#[derive(Error, Debug)]
pub enum TransportFramesError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A requested artifact or reference file does not exist
    #[error("{0}")]
    NotFound(String),

    /// The external territory/POI data service failed or timed out
    #[error("Upstream data service error: {0}")]
    Upstream(String),

    /// The matrix or grading computation failed
    #[error("Computation error: {0}")]
    Computation(String),

    /// Request rejected before any computation started
    #[error("Validation error: {0}")]
    Validation(String),

    /// Matrix blob could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// A required aggregation input was absent or empty
    #[error("Missing required input: {0}")]
    MissingRequiredInput(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl TransportFramesError {
    /// Whether this error came from the external data service rather than
    /// from local state. Upstream failures on optional categories are
    /// absorbed; upstream failures on required inputs abort the request.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            TransportFramesError::Upstream(_) | TransportFramesError::Http(_)
        )
    }
}
