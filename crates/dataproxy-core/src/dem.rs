//! Data encapsulation: ChaCha20-Poly1305 keyed from a shared group element.
//!
//! The wire form of a sealed payload is `nonce (12 bytes) || ciphertext+tag`.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use curve25519_dalek::ristretto::RistrettoPoint;
use rand::RngCore;

use crate::error::{PreError, Result};

const NONCE_LEN: usize = 12;

/// A 256-bit symmetric key for ChaCha20-Poly1305.
pub(crate) struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Derive the payload key from a shared point.
    ///
    /// `context` is mixed into the derivation; the capsule bytes go here so
    /// that a key is never reused across capsules.
    pub(crate) fn derive(shared: &RistrettoPoint, context: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key("dataproxy-pre-v1 dem key");
        hasher.update(shared.compress().as_bytes());
        hasher.update(context);
        Self(*hasher.finalize().as_bytes())
    }

    /// Encrypt and prefix a fresh random nonce.
    pub(crate) fn seal(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| PreError::Encryption(e.to_string()))?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), Payload { msg: plaintext, aad })
            .map_err(|e| PreError::Encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Split off the nonce and decrypt.
    pub(crate) fn open(&self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN {
            return Err(PreError::Decryption(format!(
                "ciphertext too short: {} bytes",
                ciphertext.len()
            )));
        }
        let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);

        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| PreError::Decryption(e.to_string()))?;

        cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad })
            .map_err(|_| PreError::Decryption("authentication failed".into()))
    }
}
