//! Error types for the access module.

use dataproxy_core::PreError;
use thiserror::Error;

/// Errors that can occur while building or reading asset documents.
#[derive(Debug, Error)]
pub enum AccessError {
    /// A required field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Document (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An embedded artifact did not decode.
    #[error("core error: {0}")]
    Core(#[from] PreError),
}

/// Result type for access operations.
pub type Result<T> = std::result::Result<T, AccessError>;
