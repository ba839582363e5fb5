//! The stored unit of the registry.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use dataproxy_access::{DocumentId, MetadataDocument};
use dataproxy_core::{AssetId, Capsule, ThresholdPolicy, VerifiedKeyFrag};

use crate::error::{Result, StoreError};

/// Everything the registry keeps for one asset.
///
/// Immutable once built, apart from the consumption counter which the
/// backing store maintains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    asset_id: AssetId,
    ciphertext: Vec<u8>,
    capsule: Capsule,
    kfrags: Vec<VerifiedKeyFrag>,
    policy: ThresholdPolicy,
    document: MetadataDocument,
    stored_at: DateTime<Utc>,
    consumptions: u64,
}

impl AssetRecord {
    /// Validate the artifacts and assemble a record.
    ///
    /// The kfrag set must be one complete delegation: fragments from a
    /// single owner to a single consumer under one precursor and policy,
    /// exactly `n` of them and all distinct. The document must be the one
    /// built for this asset, embedding this ciphertext, capsule, owner key
    /// and kfrag set.
    pub fn new(
        asset_id: AssetId,
        ciphertext: Vec<u8>,
        capsule: Capsule,
        kfrags: Vec<VerifiedKeyFrag>,
        document: MetadataDocument,
    ) -> Result<Self> {
        if ciphertext.is_empty() {
            return Err(StoreError::Validation("ciphertext is empty".into()));
        }
        if !capsule.verify() {
            return Err(StoreError::Validation("capsule does not verify".into()));
        }

        let first = kfrags
            .first()
            .ok_or_else(|| StoreError::Validation("key fragment set is empty".into()))?;
        if kfrags.iter().any(|k| !k.same_delegation(first)) {
            return Err(StoreError::Validation(
                "key fragments belong to different delegations".into(),
            ));
        }
        let policy = first.policy();
        let distinct: BTreeSet<_> = kfrags.iter().map(VerifiedKeyFrag::id).collect();
        if distinct.len() != usize::from(policy.shares()) {
            return Err(StoreError::Validation(format!(
                "expected {} distinct key fragments, got {}",
                policy.shares(),
                distinct.len()
            )));
        }

        if document.id != DocumentId::for_asset(&asset_id) {
            return Err(StoreError::Validation(format!(
                "document {} does not describe asset {}",
                document.id, asset_id
            )));
        }
        if document.ciphertext()? != ciphertext || document.capsule()? != capsule {
            return Err(StoreError::Validation(
                "document artifacts do not match the record".into(),
            ));
        }
        if document.owner_public_key()? != first.delegating_key() {
            return Err(StoreError::Validation(
                "document owner key did not issue the key fragments".into(),
            ));
        }
        let embedded = document.kfrags()?;
        if embedded.len() != kfrags.len()
            || embedded
                .iter()
                .zip(&kfrags)
                .any(|(doc, k)| *doc != k.clone().unverify())
        {
            return Err(StoreError::Validation(
                "document key fragments do not match the record".into(),
            ));
        }

        Ok(Self {
            asset_id,
            ciphertext,
            capsule,
            kfrags,
            policy,
            document,
            stored_at: Utc::now(),
            consumptions: 0,
        })
    }

    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    pub fn kfrags(&self) -> &[VerifiedKeyFrag] {
        &self.kfrags
    }

    /// The delegation policy shared by all stored fragments.
    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    pub fn document(&self) -> &MetadataDocument {
        &self.document
    }

    /// When the record was assembled.
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// How many times the asset has been consumed successfully.
    pub fn consumptions(&self) -> u64 {
        self.consumptions
    }

    /// Count one more consumption. Called by store backends.
    pub fn increment_consumptions(&mut self) -> u64 {
        self.consumptions += 1;
        self.consumptions
    }
}
