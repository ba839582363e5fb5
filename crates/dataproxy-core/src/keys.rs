//! Key material for the data proxy.
//!
//! Two independent key families:
//!
//! - [`Keypair`]: Ristretto255 encryption keys, held by owners and consumers.
//! - [`SigningKeypair`]: Ed25519 keys, held by owners to sign key fragments.
//!
//! Secret halves never implement `Serialize`, so they cannot end up in a
//! stored record or document by accident.

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::curve::{generator, random_nonzero_scalar};
use crate::error::{PreError, Result};

/// A secret encryption key (a non-zero scalar).
#[derive(Clone)]
pub struct SecretKey(Scalar);

impl SecretKey {
    /// Generate a fresh random secret key.
    pub fn random() -> Self {
        Self(random_nonzero_scalar())
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(generator() * self.0)
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({:?})", self.public_key())
    }
}

/// A public encryption key (a Ristretto255 point, 32 bytes compressed).
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(RistrettoPoint);

impl PublicKey {
    /// Decode from compressed bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        CompressedRistretto(*bytes)
            .decompress()
            .map(Self)
            .ok_or_else(|| PreError::InvalidKey("not a valid ristretto255 point".into()))
    }

    /// Compressed bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.compress().to_bytes()
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| PreError::InvalidKey(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| PreError::InvalidKey(format!("expected 32 bytes, got {}", bytes.len())))?;
        Self::from_bytes(&arr)
    }

    pub(crate) fn point(&self) -> &RistrettoPoint {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

/// An encryption keypair.
#[derive(Clone)]
pub struct Keypair {
    secret: SecretKey,
    public: PublicKey,
}

impl Keypair {
    /// Generate a new random keypair.
    ///
    /// Keypairs from separate calls are cryptographically independent.
    pub fn generate() -> Self {
        SecretKey::random().into()
    }

    /// The secret half.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// The public half.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }
}

impl From<SecretKey> for Keypair {
    fn from(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public)
    }
}

/// An Ed25519 verifying key, used to authenticate key fragments.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

impl VerifyingKey {
    /// Decode from raw bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|e| PreError::InvalidKey(e.to_string()))
    }

    /// Get the raw bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        self.0
            .verify(message, signature)
            .map_err(|_| PreError::KfragVerification("invalid signature".into()))
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", &self.to_hex()[..16])
    }
}

/// A keypair for signing key fragments.
///
/// Used only for signatures, never for encryption or decryption.
#[derive(Clone)]
pub struct SigningKeypair {
    signing_key: SigningKey,
}

impl SigningKeypair {
    /// Generate a new random signing keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.signing_key.verifying_key())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKeypair({:?})", self.verifying_key())
    }
}

/// Generate a fresh encryption keypair.
pub fn generate_keypair() -> Keypair {
    Keypair::generate()
}

/// Generate a fresh signing keypair for authenticating key fragments.
pub fn generate_signing_keypair() -> SigningKeypair {
    SigningKeypair::generate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypairs_are_independent() {
        let a = generate_keypair();
        let b = generate_keypair();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = generate_keypair().public_key();
        let recovered = PublicKey::from_hex(&pk.to_hex()).unwrap();
        assert_eq!(pk, recovered);
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        assert!(matches!(
            PublicKey::from_hex("abcd"),
            Err(PreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_signing_keypair_sign_verify() {
        let signer = generate_signing_keypair();
        let message = b"kfrag payload";
        let signature = signer.sign(message);

        signer
            .verifying_key()
            .verify(message, &signature)
            .expect("valid signature should verify");

        assert!(signer.verifying_key().verify(b"kfrag payloaD", &signature).is_err());
    }

    #[test]
    fn test_signing_keypair_deterministic_from_seed() {
        let seed = [0x42u8; 32];
        let a = SigningKeypair::from_seed(&seed);
        let b = SigningKeypair::from_seed(&seed);
        assert_eq!(a.verifying_key(), b.verifying_key());
    }
}
