//! Capsules: the transform state that travels with a ciphertext.

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::{from_cbor, from_hex, to_cbor};
use crate::curve::{domain, generator, hash_to_scalar, random_nonzero_scalar};
use crate::error::{PreError, Result};
use crate::keys::{PublicKey, SecretKey};

/// A 32-byte BLAKE3 digest identifying one capsule.
pub type CapsuleDigest = [u8; 32];

/// The capsule produced alongside a ciphertext.
///
/// Holds `E = r·G`, `V = u·G` and `s = u + r·H(E, V)`. The tuple is
/// self-verifying, so a capsule that was tampered with in storage is
/// rejected before any key is derived from it.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capsule {
    pub(crate) e: RistrettoPoint,
    pub(crate) v: RistrettoPoint,
    pub(crate) s: Scalar,
}

impl Capsule {
    /// Create a capsule for `delegating_key`, returning it with the shared
    /// point that keys the payload.
    pub(crate) fn from_public_key(delegating_key: &PublicKey) -> (Self, RistrettoPoint) {
        let g = generator();
        let r = random_nonzero_scalar();
        let u = random_nonzero_scalar();

        let e = g * r;
        let v = g * u;
        let h = hash_to_scalar(domain::CAPSULE, &[&e, &v], &[]);
        let s = u + r * h;

        let shared = delegating_key.point() * (r + u);
        (Self { e, v, s }, shared)
    }

    /// Recompute the shared point with the delegating secret key.
    pub(crate) fn open_original(&self, delegating_sk: &SecretKey) -> RistrettoPoint {
        (self.e + self.v) * delegating_sk.scalar()
    }

    /// Check `s·G == V + H(E, V)·E`.
    pub fn verify(&self) -> bool {
        let h = hash_to_scalar(domain::CAPSULE, &[&self.e, &self.v], &[]);
        generator() * self.s == self.v + self.e * h
    }

    /// Fixed-width encoding `E || V || s`, used for digests and as
    /// associated data for the payload.
    pub(crate) fn canonical_bytes(&self) -> [u8; 96] {
        let mut out = [0u8; 96];
        out[..32].copy_from_slice(self.e.compress().as_bytes());
        out[32..64].copy_from_slice(self.v.compress().as_bytes());
        out[64..].copy_from_slice(self.s.as_bytes());
        out
    }

    /// BLAKE3 digest of the capsule.
    pub fn digest(&self) -> CapsuleDigest {
        *blake3::hash(&self.canonical_bytes()).as_bytes()
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        to_cbor(self)
    }

    /// Deserialize from CBOR bytes, rejecting capsules that do not verify.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let capsule: Self = from_cbor(bytes)?;
        if !capsule.verify() {
            return Err(PreError::Serialization("capsule does not verify".into()));
        }
        Ok(capsule)
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&from_hex(s)?)
    }
}

impl fmt::Debug for Capsule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capsule({})", &hex::encode(self.digest())[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;

    #[test]
    fn test_fresh_capsule_verifies() {
        let owner = Keypair::generate();
        let (capsule, _) = Capsule::from_public_key(&owner.public_key());
        assert!(capsule.verify());
    }

    #[test]
    fn test_owner_recovers_shared_point() {
        let owner = Keypair::generate();
        let (capsule, shared) = Capsule::from_public_key(&owner.public_key());
        assert_eq!(capsule.open_original(owner.secret_key()), shared);
    }

    #[test]
    fn test_tampered_capsule_fails_verification() {
        let owner = Keypair::generate();
        let (mut capsule, _) = Capsule::from_public_key(&owner.public_key());
        capsule.s += Scalar::ONE;
        assert!(!capsule.verify());
        assert!(Capsule::from_bytes(&capsule.to_bytes()).is_err());
    }

    #[test]
    fn test_capsule_bytes_roundtrip() {
        let owner = Keypair::generate();
        let (capsule, _) = Capsule::from_public_key(&owner.public_key());
        let recovered = Capsule::from_hex(&capsule.to_hex()).unwrap();
        assert_eq!(capsule, recovered);
        assert_eq!(capsule.digest(), recovered.digest());
    }
}
