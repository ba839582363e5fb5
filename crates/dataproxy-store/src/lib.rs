//! # Data Proxy Store
//!
//! The asset registry and the storage abstraction behind it.
//!
//! ## Overview
//!
//! [`AssetRegistry`] maps an asset identifier to an [`AssetRecord`]: the
//! ciphertext, its capsule, the full verified key fragment set and the
//! metadata document. Records are validated before they are written, never
//! overwritten, and never contain secret keys.
//!
//! Storage sits behind the [`AssetStore`] trait. [`MemoryStore`] keeps
//! records for the lifetime of the process.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dataproxy_store::{AssetRegistry, MemoryStore};
//!
//! async fn example() {
//!     let registry = AssetRegistry::new(MemoryStore::new());
//!
//!     // registry.store_asset(asset_id, ciphertext, capsule, kfrags, document).await?;
//!     // let record = registry.retrieve(&asset_id).await?;
//!     // let plaintext = registry.consume(&asset_id, consumer.secret_key(), &cfrags).await?;
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **No overwrite**: storing an existing id fails with `DuplicateAsset`
//! - **Counted consumption**: every successful `consume` is counted, none is refused

pub mod error;
pub mod memory;
pub mod record;
pub mod registry;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use record::AssetRecord;
pub use registry::AssetRegistry;
pub use traits::{AssetStore, InsertResult};
