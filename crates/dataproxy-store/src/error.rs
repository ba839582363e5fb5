//! Error types for the store module.

use dataproxy_access::AccessError;
use dataproxy_core::{AssetId, PreError};
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An asset with this identifier is already stored.
    #[error("asset already exists: {0}")]
    DuplicateAsset(AssetId),

    /// No asset with this identifier is stored.
    #[error("asset not found: {0}")]
    AssetNotFound(AssetId),

    /// A record field is missing or inconsistent.
    #[error("validation error: {0}")]
    Validation(String),

    /// Decryption during consumption failed.
    #[error(transparent)]
    Pre(#[from] PreError),

    /// The embedded document could not be read.
    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
