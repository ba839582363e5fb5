//! Strong type definitions for the data proxy.
//!
//! Identifiers and policies are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PreError, Result};

/// A 32-byte key fragment identifier, drawn at random per fragment.
///
/// Exactly one capsule fragment is produced per key fragment, and the
/// capsule fragment carries the same identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyFragId(pub [u8; 32]);

impl KeyFragId {
    /// Draw a fresh random identifier.
    pub fn random() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for KeyFragId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyFragId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for KeyFragId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for KeyFragId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// The `(t, n)` threshold policy of one delegation.
///
/// `n` fragments are issued and any `t` of them reconstruct the
/// decryption transform. The invariant `1 <= t <= n` holds for every
/// constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    threshold: u16,
    shares: u16,
}

impl ThresholdPolicy {
    /// Create a policy, failing with `InvalidThreshold` unless `1 <= t <= n`.
    pub fn new(threshold: u16, shares: u16) -> Result<Self> {
        if threshold == 0 || threshold > shares {
            return Err(PreError::InvalidThreshold { threshold, shares });
        }
        Ok(Self { threshold, shares })
    }

    /// Minimum number of distinct capsule fragments needed to decrypt.
    pub const fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Total number of fragments issued.
    pub const fn shares(&self) -> u16 {
        self.shares
    }

    /// Re-check the invariant on a value that came off the wire.
    pub(crate) fn check(&self) -> Result<()> {
        Self::new(self.threshold, self.shares).map(|_| ())
    }

    /// Canonical byte form, used inside signed messages.
    pub(crate) fn to_le_bytes(self) -> [u8; 4] {
        let t = self.threshold.to_le_bytes();
        let n = self.shares.to_le_bytes();
        [t[0], t[1], n[0], n[1]]
    }
}

impl fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-of-{}", self.threshold, self.shares)
    }
}

/// Identifier of a stored data asset.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// Create an asset identifier. Blank identifiers are rejected.
    pub fn new(id: impl Into<String>) -> std::result::Result<Self, InvalidAssetId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidAssetId);
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetId {
    type Error = InvalidAssetId;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AssetId {
    type Error = InvalidAssetId;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

/// An asset identifier was blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("asset identifier is missing")]
pub struct InvalidAssetId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_bounds() {
        assert!(ThresholdPolicy::new(1, 1).is_ok());
        assert!(ThresholdPolicy::new(2, 3).is_ok());
        assert!(ThresholdPolicy::new(3, 3).is_ok());

        assert!(matches!(
            ThresholdPolicy::new(0, 3),
            Err(PreError::InvalidThreshold { threshold: 0, shares: 3 })
        ));
        assert!(matches!(
            ThresholdPolicy::new(4, 3),
            Err(PreError::InvalidThreshold { threshold: 4, shares: 3 })
        ));
    }

    #[test]
    fn test_policy_display() {
        let policy = ThresholdPolicy::new(2, 3).unwrap();
        assert_eq!(policy.to_string(), "2-of-3");
    }

    #[test]
    fn test_kfrag_id_hex_roundtrip() {
        let id = KeyFragId::from_bytes([0x42; 32]);
        let recovered = KeyFragId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, recovered);
    }

    proptest::proptest! {
        #[test]
        fn prop_policy_accepts_exactly_valid_pairs(t in 0u16..64, n in 0u16..64) {
            let valid = t >= 1 && t <= n;
            proptest::prop_assert_eq!(ThresholdPolicy::new(t, n).is_ok(), valid);
        }
    }

    #[test]
    fn test_asset_id_rejects_blank() {
        assert!(AssetId::new("").is_err());
        assert!(AssetId::new("   ").is_err());
        assert_eq!(AssetId::new("asset-001").unwrap().as_str(), "asset-001");
    }
}
