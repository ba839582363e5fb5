//! Key fragments: signed threshold shares of a re-encryption key.
//!
//! A delegation from owner `A` to consumer `B` is split into `n` fragments.
//! Any `t` capsule fragments produced from distinct key fragments let `B`
//! open a capsule that was made for `A`. One fragment on its own reveals
//! nothing about `A`'s secret key or the plaintext.
//!
//! ## Construction
//!
//! The owner draws an ephemeral precursor `X = x·G` and computes
//! `d = H(X, B, x·B)`. The shares lie on a random polynomial of degree
//! `t - 1` whose constant term is `a·d⁻¹`. Each fragment carries
//! a commitment `key·U` and an Ed25519 signature binding its id, its
//! commitment, the precursor, the policy and both public keys.

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec::{from_cbor, from_hex, to_cbor};
use crate::curve::{
    domain, generator, hash_to_scalar, poly_eval, random_nonzero_scalar, COMMITMENT_GENERATOR,
};
use crate::error::{PreError, Result};
use crate::keys::{PublicKey, SecretKey, SigningKeypair, VerifyingKey};
use crate::types::{KeyFragId, ThresholdPolicy};

/// Domain separation prefix for signed key fragment messages.
const SIGN_DOMAIN: &[u8] = b"dataproxy-pre/kfrag-v1";

/// A key fragment as issued or as received from untrusted storage.
///
/// Must pass [`KeyFrag::verify`] before it can be used for re-encryption.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFrag {
    pub(crate) id: KeyFragId,
    pub(crate) key: Scalar,
    pub(crate) precursor: RistrettoPoint,
    pub(crate) commitment: RistrettoPoint,
    pub(crate) policy: ThresholdPolicy,
    pub(crate) delegating_key: PublicKey,
    pub(crate) receiving_key: PublicKey,
    pub(crate) signature: Signature,
}

impl KeyFrag {
    /// The fragment identifier.
    pub fn id(&self) -> KeyFragId {
        self.id
    }

    /// The delegation policy this fragment was issued under.
    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// Check authenticity against the expected delegation.
    ///
    /// Deterministic: the same inputs always give the same outcome.
    pub fn verify(
        self,
        verifying_key: &VerifyingKey,
        delegating_key: &PublicKey,
        receiving_key: &PublicKey,
    ) -> Result<VerifiedKeyFrag> {
        if &self.delegating_key != delegating_key {
            return Err(PreError::KfragVerification(
                "delegating key does not match".into(),
            ));
        }
        if &self.receiving_key != receiving_key {
            return Err(PreError::KfragVerification(
                "receiving key does not match".into(),
            ));
        }
        self.policy
            .check()
            .map_err(|e| PreError::KfragVerification(e.to_string()))?;
        if !self.commitment_holds() {
            return Err(PreError::KfragVerification(
                "commitment does not match key".into(),
            ));
        }

        verifying_key.verify(&self.signed_message(), &self.signature)?;

        Ok(VerifiedKeyFrag(self))
    }

    /// `key·U == commitment`.
    pub(crate) fn commitment_holds(&self) -> bool {
        *COMMITMENT_GENERATOR * self.key == self.commitment
    }

    fn signed_message(&self) -> Vec<u8> {
        signed_message(
            &self.id,
            &self.commitment,
            &self.precursor,
            self.policy,
            &self.delegating_key,
            &self.receiving_key,
        )
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        to_cbor(self)
    }

    /// Deserialize from CBOR bytes. The result is still unverified.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        from_cbor(bytes)
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

impl fmt::Debug for KeyFrag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyFrag")
            .field("id", &self.id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// A key fragment that passed verification.
///
/// Only [`KeyFrag::verify`] and [`VerifiedKeyFrag::from_verified_bytes`]
/// construct this type, and [`crate::reencrypt`] accepts nothing else.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifiedKeyFrag(KeyFrag);

impl VerifiedKeyFrag {
    /// Rehydrate a fragment that was verified before it went into trusted
    /// storage. The signature is not re-checked; re-encryption still checks
    /// the key commitment.
    pub fn from_verified_bytes(bytes: &[u8]) -> Result<Self> {
        KeyFrag::from_bytes(bytes).map(Self)
    }

    /// The fragment identifier.
    pub fn id(&self) -> KeyFragId {
        self.0.id
    }

    /// The delegation policy.
    pub fn policy(&self) -> ThresholdPolicy {
        self.0.policy
    }

    /// The owner's public key.
    pub fn delegating_key(&self) -> PublicKey {
        self.0.delegating_key
    }

    /// The consumer's public key.
    pub fn receiving_key(&self) -> PublicKey {
        self.0.receiving_key
    }

    /// Whether both fragments were issued in the same delegation: one
    /// precursor, one policy, one owner and one consumer.
    pub fn same_delegation(&self, other: &VerifiedKeyFrag) -> bool {
        self.0.precursor == other.0.precursor
            && self.0.policy == other.0.policy
            && self.0.delegating_key == other.0.delegating_key
            && self.0.receiving_key == other.0.receiving_key
    }

    /// Drop the verified marker.
    pub fn unverify(self) -> KeyFrag {
        self.0
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    pub(crate) fn inner(&self) -> &KeyFrag {
        &self.0
    }
}

impl fmt::Debug for VerifiedKeyFrag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VerifiedKeyFrag").field(&self.0).finish()
    }
}

fn signed_message(
    id: &KeyFragId,
    commitment: &RistrettoPoint,
    precursor: &RistrettoPoint,
    policy: ThresholdPolicy,
    delegating_key: &PublicKey,
    receiving_key: &PublicKey,
) -> Vec<u8> {
    let mut msg = Vec::with_capacity(SIGN_DOMAIN.len() + 32 * 5 + 4);
    msg.extend_from_slice(SIGN_DOMAIN);
    msg.extend_from_slice(id.as_bytes());
    msg.extend_from_slice(commitment.compress().as_bytes());
    msg.extend_from_slice(precursor.compress().as_bytes());
    msg.extend_from_slice(&policy.to_le_bytes());
    msg.extend_from_slice(&delegating_key.to_bytes());
    msg.extend_from_slice(&receiving_key.to_bytes());
    msg
}

/// Values both the issuer and the consumer can compute for a delegation.
pub(crate) struct DelegationSecrets {
    /// `H(X, B, dh)`.
    pub d: Scalar,
    precursor: RistrettoPoint,
    receiving: RistrettoPoint,
    dh: RistrettoPoint,
}

impl DelegationSecrets {
    pub(crate) fn new(
        precursor: RistrettoPoint,
        receiving: RistrettoPoint,
        dh: RistrettoPoint,
    ) -> Self {
        let d = hash_to_scalar(domain::NON_INTERACTIVE, &[&precursor, &receiving, &dh], &[]);
        Self {
            d,
            precursor,
            receiving,
            dh,
        }
    }

    /// Share index of the fragment with the given id.
    pub(crate) fn share_index(&self, id: &KeyFragId) -> Scalar {
        hash_to_scalar(
            domain::SHARE_INDEX,
            &[&self.precursor, &self.receiving, &self.dh],
            &[id.as_bytes()],
        )
    }
}

/// Generate `shares` signed key fragments delegating from the owner to the
/// consumer, any `threshold` of which suffice.
///
/// Fails with `InvalidThreshold` before any cryptographic work unless
/// `1 <= threshold <= shares`.
pub fn generate_kfrags(
    delegating_sk: &SecretKey,
    signer: &SigningKeypair,
    receiving_pk: &PublicKey,
    threshold: u16,
    shares: u16,
) -> Result<Vec<KeyFrag>> {
    let policy = ThresholdPolicy::new(threshold, shares)?;

    let delegating_pk = delegating_sk.public_key();

    let x = random_nonzero_scalar();
    let precursor = generator() * x;
    let dh = receiving_pk.point() * x;
    let secrets = DelegationSecrets::new(precursor, *receiving_pk.point(), dh);

    let mut coeffs = Vec::with_capacity(threshold as usize);
    coeffs.push(delegating_sk.scalar() * secrets.d.invert());
    coeffs.extend((1..threshold).map(|_| random_nonzero_scalar()));

    let kfrags = (0..shares)
        .map(|_| {
            let id = KeyFragId::random();
            let key = poly_eval(&coeffs, secrets.share_index(&id));
            let commitment = *COMMITMENT_GENERATOR * key;
            let message = signed_message(
                &id,
                &commitment,
                &precursor,
                policy,
                &delegating_pk,
                receiving_pk,
            );

            KeyFrag {
                id,
                key,
                precursor,
                commitment,
                policy,
                delegating_key: delegating_pk,
                receiving_key: *receiving_pk,
                signature: signer.sign(&message),
            }
        })
        .collect();

    tracing::debug!(%policy, "generated key fragments");
    Ok(kfrags)
}

/// Verify a key fragment against the owner's verifying key and the
/// delegation it claims to belong to.
pub fn verify_kfrag(
    kfrag: KeyFrag,
    verifying_key: &VerifyingKey,
    delegating_key: &PublicKey,
    receiving_key: &PublicKey,
) -> Result<VerifiedKeyFrag> {
    kfrag.verify(verifying_key, delegating_key, receiving_key)
}
