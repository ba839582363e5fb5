//! AssetRegistry: validated storage, retrieval and consumption of assets.

use dataproxy_access::MetadataDocument;
use dataproxy_core::{decrypt, AssetId, Capsule, CapsuleFrag, SecretKey, VerifiedKeyFrag};

use crate::error::{Result, StoreError};
use crate::record::AssetRecord;
use crate::traits::{AssetStore, InsertResult};

/// The registry that owns every stored asset record.
///
/// Constructed once per process around a backing store and shared by
/// reference with whoever needs it.
pub struct AssetRegistry<S: AssetStore> {
    store: S,
}

impl<S: AssetStore> AssetRegistry<S> {
    /// Create a registry over a backing store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and store a new asset.
    ///
    /// Nothing is written unless every check passes. Storing an id that
    /// is already taken fails with `DuplicateAsset` and leaves the existing
    /// record untouched.
    pub async fn store_asset(
        &self,
        asset_id: AssetId,
        ciphertext: Vec<u8>,
        capsule: Capsule,
        kfrags: Vec<VerifiedKeyFrag>,
        document: MetadataDocument,
    ) -> Result<()> {
        let record = AssetRecord::new(asset_id.clone(), ciphertext, capsule, kfrags, document)?;
        let policy = record.policy();

        match self.store.insert_asset(record).await? {
            InsertResult::Inserted => {
                tracing::info!(asset = %asset_id, %policy, "stored asset");
                Ok(())
            }
            InsertResult::AlreadyExists => {
                tracing::warn!(asset = %asset_id, "rejected duplicate asset");
                Err(StoreError::DuplicateAsset(asset_id))
            }
        }
    }

    /// Get a stored record.
    pub async fn retrieve(&self, asset_id: &AssetId) -> Result<AssetRecord> {
        self.store
            .get_asset(asset_id)
            .await?
            .ok_or_else(|| StoreError::AssetNotFound(asset_id.clone()))
    }

    /// Decrypt a stored asset with the consumer's key and a quorum of
    /// capsule fragments.
    ///
    /// Consumption is counted but not limited: the same fragments may be
    /// used again.
    pub async fn consume(
        &self,
        asset_id: &AssetId,
        consumer_sk: &SecretKey,
        cfrags: &[CapsuleFrag],
    ) -> Result<Vec<u8>> {
        let record = self.retrieve(asset_id).await?;
        let plaintext = decrypt(consumer_sk, record.capsule(), cfrags, record.ciphertext())?;

        let consumptions = self
            .store
            .record_consumption(asset_id)
            .await?
            .ok_or_else(|| StoreError::AssetNotFound(asset_id.clone()))?;
        tracing::info!(
            asset = %asset_id,
            cfrags = cfrags.len(),
            consumptions,
            "consumed asset"
        );
        Ok(plaintext)
    }

    /// Remove a stored asset.
    pub async fn remove(&self, asset_id: &AssetId) -> Result<AssetRecord> {
        let record = self
            .store
            .remove_asset(asset_id)
            .await?
            .ok_or_else(|| StoreError::AssetNotFound(asset_id.clone()))?;
        tracing::debug!(asset = %asset_id, "removed asset");
        Ok(record)
    }

    /// All stored asset ids.
    pub async fn list(&self) -> Result<Vec<AssetId>> {
        self.store.list_assets().await
    }

    /// Whether an asset is stored.
    pub async fn contains(&self, asset_id: &AssetId) -> Result<bool> {
        self.store.has_asset(asset_id).await
    }

    /// Number of stored assets.
    pub async fn len(&self) -> Result<usize> {
        self.store.count().await
    }

    /// Whether the registry is empty.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
