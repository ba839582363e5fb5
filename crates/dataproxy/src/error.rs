//! Error types for the proxy.

use std::fmt;

use dataproxy_access::AccessError;
use dataproxy_core::{AssetId, InvalidAssetId, PreError};
use dataproxy_store::StoreError;
use thiserror::Error;

/// Errors that can occur during proxy operations.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Cryptographic error.
    #[error("crypto error: {0}")]
    Pre(#[from] PreError),

    /// Document error.
    #[error("document error: {0}")]
    Access(#[from] AccessError),

    /// Registry error.
    #[error("registry error: {0}")]
    Store(#[from] StoreError),

    /// A request argument is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed asset identifier.
    #[error("validation error: {0}")]
    InvalidAssetId(#[from] InvalidAssetId),

    /// A relay request named a fragment that does not exist.
    #[error("validation error: key fragment #{position} requested, asset has {available}")]
    InvalidSelection { position: usize, available: usize },

    /// The token gate refused the consumer.
    #[error("token burn not authorized for asset {asset_id} and consumer {consumer}")]
    TokenBurnNotAuthorized { asset_id: AssetId, consumer: String },

    /// Bad configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    /// The kind of failure, for operator-facing reporting.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyError::Pre(e) => pre_kind(e),
            ProxyError::Access(e) => access_kind(e),
            ProxyError::Store(e) => match e {
                StoreError::DuplicateAsset(_) => ErrorKind::DuplicateAsset,
                StoreError::AssetNotFound(_) => ErrorKind::AssetNotFound,
                StoreError::Validation(_) => ErrorKind::Validation,
                StoreError::Pre(e) => pre_kind(e),
                StoreError::Access(e) => access_kind(e),
            },
            ProxyError::Validation(_)
            | ProxyError::InvalidAssetId(_)
            | ProxyError::InvalidSelection { .. } => ErrorKind::Validation,
            ProxyError::TokenBurnNotAuthorized { .. } => ErrorKind::TokenBurnNotAuthorized,
            ProxyError::Config(_) => ErrorKind::Config,
        }
    }
}

fn pre_kind(e: &PreError) -> ErrorKind {
    match e {
        PreError::InvalidThreshold { .. } => ErrorKind::InvalidThreshold,
        PreError::Encryption(_) => ErrorKind::Encryption,
        PreError::KfragVerification(_) => ErrorKind::KfragVerification,
        PreError::UnverifiedFragment(_) => ErrorKind::UnverifiedFragment,
        PreError::InsufficientFragments { .. } => ErrorKind::InsufficientFragments,
        PreError::Decryption(_) => ErrorKind::Decryption,
        PreError::InvalidKey(_) | PreError::Serialization(_) => ErrorKind::Validation,
    }
}

fn access_kind(e: &AccessError) -> ErrorKind {
    match e {
        AccessError::Validation(_) | AccessError::Serialization(_) => ErrorKind::Validation,
        AccessError::Core(e) => pre_kind(e),
    }
}

/// Stable failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidThreshold,
    Encryption,
    KfragVerification,
    UnverifiedFragment,
    InsufficientFragments,
    Decryption,
    DuplicateAsset,
    AssetNotFound,
    Validation,
    TokenBurnNotAuthorized,
    Config,
}

impl ErrorKind {
    /// Stable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidThreshold => "InvalidThresholdError",
            ErrorKind::Encryption => "EncryptionError",
            ErrorKind::KfragVerification => "KfragVerificationError",
            ErrorKind::UnverifiedFragment => "UnverifiedFragmentError",
            ErrorKind::InsufficientFragments => "InsufficientFragmentsError",
            ErrorKind::Decryption => "DecryptionError",
            ErrorKind::DuplicateAsset => "DuplicateAssetError",
            ErrorKind::AssetNotFound => "AssetNotFoundError",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::TokenBurnNotAuthorized => "TokenBurnNotAuthorizedError",
            ErrorKind::Config => "ConfigError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for proxy operations.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_survive_wrapping() {
        let insufficient = PreError::InsufficientFragments {
            required: 2,
            supplied: 1,
        };
        let err = ProxyError::from(StoreError::from(insufficient));
        assert_eq!(err.kind(), ErrorKind::InsufficientFragments);

        let err = ProxyError::from(AccessError::from(PreError::Decryption("x".into())));
        assert_eq!(err.kind(), ErrorKind::Decryption);

        let id = AssetId::new("asset-001").unwrap();
        let err = ProxyError::from(StoreError::DuplicateAsset(id));
        assert_eq!(err.kind().as_str(), "DuplicateAssetError");
    }

    #[test]
    fn test_invalid_asset_id_is_validation() {
        let err = ProxyError::from(AssetId::new("  ").unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
