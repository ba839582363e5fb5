//! Encryption and decryption entry points of the proxy re-encryption engine.

use std::collections::BTreeMap;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;

use crate::capsule::Capsule;
use crate::cfrag::CapsuleFrag;
use crate::curve::lambda_at_zero;
use crate::dem::EncryptionKey;
use crate::error::{PreError, Result};
use crate::keys::{PublicKey, SecretKey};
use crate::kfrag::DelegationSecrets;

/// Encrypt `plaintext` for the owner of `delegating_pk`.
///
/// Fresh randomness per call: encrypting the same plaintext twice gives
/// different ciphertexts and capsules.
pub fn encrypt(delegating_pk: &PublicKey, plaintext: &[u8]) -> Result<(Vec<u8>, Capsule)> {
    if *delegating_pk.point() == RistrettoPoint::identity() {
        return Err(PreError::Encryption("public key is the identity point".into()));
    }

    let (capsule, shared) = Capsule::from_public_key(delegating_pk);
    let aad = capsule.canonical_bytes();
    let ciphertext = EncryptionKey::derive(&shared, &aad).seal(plaintext, &aad)?;

    tracing::debug!(bytes = plaintext.len(), "encrypted payload");
    Ok((ciphertext, capsule))
}

/// Decrypt a ciphertext directly with the owner's own secret key.
pub fn decrypt_original(
    delegating_sk: &SecretKey,
    capsule: &Capsule,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    if !capsule.verify() {
        return Err(PreError::Decryption("capsule does not verify".into()));
    }
    let aad = capsule.canonical_bytes();
    let shared = capsule.open_original(delegating_sk);
    EncryptionKey::derive(&shared, &aad).open(ciphertext, &aad)
}

/// Decrypt a re-encrypted ciphertext with the consumer's secret key and a
/// quorum of capsule fragments.
///
/// Duplicate fragments (same key fragment id) count once. Fails with
/// `InsufficientFragments` when fewer than `t` distinct fragments are
/// supplied, and with `Decryption` when the fragments do not belong to this
/// capsule, mix delegations, or were made for a different consumer.
pub fn decrypt(
    receiving_sk: &SecretKey,
    capsule: &Capsule,
    cfrags: &[CapsuleFrag],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let first = cfrags.first().ok_or(PreError::InsufficientFragments {
        required: 1,
        supplied: 0,
    })?;

    if !capsule.verify() {
        return Err(PreError::Decryption("capsule does not verify".into()));
    }

    let digest = capsule.digest();
    let mut distinct: BTreeMap<_, &CapsuleFrag> = BTreeMap::new();
    for cfrag in cfrags {
        if cfrag.capsule_digest != digest {
            return Err(PreError::Decryption(format!(
                "capsule fragment {} belongs to a different capsule",
                cfrag.kfrag_id
            )));
        }
        if cfrag.precursor != first.precursor || cfrag.policy != first.policy {
            return Err(PreError::Decryption(
                "capsule fragments come from different delegations".into(),
            ));
        }
        distinct.entry(cfrag.kfrag_id).or_insert(cfrag);
    }

    let required = first.policy.threshold() as usize;
    if distinct.len() < required {
        return Err(PreError::InsufficientFragments {
            required,
            supplied: distinct.len(),
        });
    }

    let receiving_pk = receiving_sk.public_key();
    let dh = first.precursor * receiving_sk.scalar();
    let secrets = DelegationSecrets::new(first.precursor, *receiving_pk.point(), dh);

    let xs: Vec<Scalar> = distinct.keys().map(|id| secrets.share_index(id)).collect();
    let (e_prime, v_prime) = distinct.values().enumerate().fold(
        (RistrettoPoint::identity(), RistrettoPoint::identity()),
        |(e, v), (i, cfrag)| {
            let lambda = lambda_at_zero(&xs, i);
            (e + cfrag.e1 * lambda, v + cfrag.v1 * lambda)
        },
    );

    let shared = (e_prime + v_prime) * secrets.d;
    let aad = capsule.canonical_bytes();
    EncryptionKey::derive(&shared, &aad).open(ciphertext, &aad)
}
