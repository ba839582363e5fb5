//! Capsule fragments: one verified key fragment applied to one capsule.

use curve25519_dalek::ristretto::RistrettoPoint;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capsule::{Capsule, CapsuleDigest};
use crate::codec::{from_cbor, from_hex, to_cbor};
use crate::error::{PreError, Result};
use crate::kfrag::VerifiedKeyFrag;
use crate::types::{KeyFragId, ThresholdPolicy};

/// The output of re-encrypting a capsule with one verified key fragment.
///
/// Carries the id of the key fragment it came from and the digest of the
/// capsule it was made for, so mismatched fragments are caught at
/// decryption time.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleFrag {
    pub(crate) kfrag_id: KeyFragId,
    pub(crate) precursor: RistrettoPoint,
    pub(crate) policy: ThresholdPolicy,
    pub(crate) capsule_digest: CapsuleDigest,
    pub(crate) e1: RistrettoPoint,
    pub(crate) v1: RistrettoPoint,
}

impl CapsuleFrag {
    /// Id of the key fragment this capsule fragment came from.
    pub fn kfrag_id(&self) -> KeyFragId {
        self.kfrag_id
    }

    /// The delegation policy.
    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// Digest of the capsule this fragment was produced from.
    pub fn capsule_digest(&self) -> &CapsuleDigest {
        &self.capsule_digest
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        to_cbor(self)
    }

    /// Deserialize from CBOR bytes.
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

impl fmt::Debug for CapsuleFrag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapsuleFrag")
            .field("kfrag_id", &self.kfrag_id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Re-encrypt a capsule with a verified key fragment.
///
/// A pure function of its inputs: the same pair always yields the same
/// capsule fragment. Fails with `UnverifiedFragment` if the fragment's key
/// does not match its commitment, which can only happen for fragments
/// rehydrated with [`VerifiedKeyFrag::from_verified_bytes`] from storage
/// that was not in fact trustworthy.
pub fn reencrypt(capsule: &Capsule, kfrag: &VerifiedKeyFrag) -> Result<CapsuleFrag> {
    let kfrag = kfrag.inner();
    if !kfrag.commitment_holds() {
        return Err(PreError::UnverifiedFragment(kfrag.id.to_string()));
    }

    Ok(CapsuleFrag {
        kfrag_id: kfrag.id,
        precursor: kfrag.precursor,
        policy: kfrag.policy,
        capsule_digest: capsule.digest(),
        e1: capsule.e * kfrag.key,
        v1: capsule.v * kfrag.key,
    })
}
