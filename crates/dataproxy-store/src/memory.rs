//! In-memory implementation of the AssetStore trait.
//!
//! Everything lives for the lifetime of the process. Thread-safe via an
//! async RwLock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use dataproxy_core::AssetId;

use crate::error::Result;
use crate::record::AssetRecord;
use crate::traits::{AssetStore, InsertResult};

/// In-memory asset store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    assets: RwLock<BTreeMap<AssetId, AssetRecord>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn insert_asset(&self, record: AssetRecord) -> Result<InsertResult> {
        let mut assets = self.assets.write().await;
        if assets.contains_key(record.asset_id()) {
            return Ok(InsertResult::AlreadyExists);
        }
        assets.insert(record.asset_id().clone(), record);
        Ok(InsertResult::Inserted)
    }

    async fn get_asset(&self, asset_id: &AssetId) -> Result<Option<AssetRecord>> {
        Ok(self.assets.read().await.get(asset_id).cloned())
    }

    async fn has_asset(&self, asset_id: &AssetId) -> Result<bool> {
        Ok(self.assets.read().await.contains_key(asset_id))
    }

    async fn list_assets(&self) -> Result<Vec<AssetId>> {
        Ok(self.assets.read().await.keys().cloned().collect())
    }

    async fn remove_asset(&self, asset_id: &AssetId) -> Result<Option<AssetRecord>> {
        Ok(self.assets.write().await.remove(asset_id))
    }

    async fn record_consumption(&self, asset_id: &AssetId) -> Result<Option<u64>> {
        Ok(self
            .assets
            .write()
            .await
            .get_mut(asset_id)
            .map(AssetRecord::increment_consumptions))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.assets.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Published;

    fn record(id: &str) -> AssetRecord {
        let p = Published::new(id, b"payload", 1, 2);
        AssetRecord::new(p.asset_id, p.ciphertext, p.capsule, p.kfrags, p.document).unwrap()
    }

    #[tokio::test]
    async fn test_insert_is_not_overwrite() {
        let store = MemoryStore::new();
        let first = record("asset-001");
        let second = record("asset-001");

        assert_eq!(
            store.insert_asset(first.clone()).await.unwrap(),
            InsertResult::Inserted
        );
        assert_eq!(
            store.insert_asset(second).await.unwrap(),
            InsertResult::AlreadyExists
        );
        let stored = store.get_asset(first.asset_id()).await.unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_list_is_ordered() {
        let store = MemoryStore::new();
        for id in ["b", "c", "a"] {
            store.insert_asset(record(id)).await.unwrap();
        }
        let ids: Vec<_> = store
            .list_assets()
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_record_consumption() {
        let store = MemoryStore::new();
        let r = record("asset-001");
        let id = r.asset_id().clone();
        store.insert_asset(r).await.unwrap();

        assert_eq!(store.record_consumption(&id).await.unwrap(), Some(1));
        assert_eq!(store.record_consumption(&id).await.unwrap(), Some(2));
        let missing = AssetId::new("missing").unwrap();
        assert_eq!(store.record_consumption(&missing).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_racing_inserts_yield_one_winner() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let r = record("asset-001");
                tokio::spawn(async move { store.insert_asset(r).await.unwrap() })
            })
            .collect();

        let mut inserted = 0;
        for h in handles {
            if h.await.unwrap() == InsertResult::Inserted {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert!(store.has_asset(&AssetId::new("asset-001").unwrap()).await.unwrap());
    }
}
