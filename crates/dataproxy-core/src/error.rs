//! Error types for the data proxy core.

use thiserror::Error;

/// Errors raised by key handling and the proxy re-encryption engine.
///
/// Every variant is a distinct failure kind so callers can tell
/// "need more shares" apart from "wrong shares" apart from "bad input".
#[derive(Debug, Error)]
pub enum PreError {
    /// The `(t, n)` policy violates `1 <= t <= n`.
    #[error("invalid threshold policy: threshold {threshold}, shares {shares}")]
    InvalidThreshold { threshold: u16, shares: u16 },

    /// Encryption could not proceed (malformed key input).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// A key fragment failed authenticity checks.
    #[error("key fragment verification failed: {0}")]
    KfragVerification(String),

    /// A fragment presented for re-encryption does not hold up as verified.
    #[error("unverified key fragment {0}")]
    UnverifiedFragment(String),

    /// Fewer distinct capsule fragments than the threshold requires.
    #[error("insufficient capsule fragments: {supplied} supplied, {required} required")]
    InsufficientFragments { required: usize, supplied: usize },

    /// Fragments were well-formed but do not match the capsule, the
    /// delegation or the consumer key.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Key bytes that do not decode to a valid key.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Artifact bytes that do not decode.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, PreError>;
