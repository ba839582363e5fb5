//! AssetStore trait: the abstract interface behind the registry.
//!
//! The registry is storage-agnostic. [`crate::MemoryStore`] is the
//! process-lifetime implementation; a durable backend would implement the
//! same trait.

use async_trait::async_trait;
use dataproxy_core::AssetId;

use crate::error::Result;
use crate::record::AssetRecord;

/// Result of inserting an asset record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Record was inserted.
    Inserted,
    /// A record with the same asset id exists; nothing was written.
    AlreadyExists,
}

/// Async interface for asset persistence.
///
/// # Design Notes
///
/// - **Atomic inserts**: the existence check and the write happen under
///   one critical section, so two racing inserts for one id yield exactly
///   one `Inserted`.
/// - **No overwrite**: an existing record is never replaced by `insert_asset`.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Insert a record unless its asset id is taken.
    async fn insert_asset(&self, record: AssetRecord) -> Result<InsertResult>;

    /// Get a record by asset id.
    async fn get_asset(&self, asset_id: &AssetId) -> Result<Option<AssetRecord>>;

    /// Check if an asset is stored.
    async fn has_asset(&self, asset_id: &AssetId) -> Result<bool>;

    /// All stored asset ids, in ascending order.
    async fn list_assets(&self) -> Result<Vec<AssetId>>;

    /// Remove a record, returning it if it existed.
    async fn remove_asset(&self, asset_id: &AssetId) -> Result<Option<AssetRecord>>;

    /// Count one consumption of an asset, returning the new total.
    ///
    /// Returns `None` if the asset is not stored.
    async fn record_consumption(&self, asset_id: &AssetId) -> Result<Option<u64>>;

    /// Number of stored assets.
    async fn count(&self) -> Result<usize>;
}
