//! # Data Proxy
//!
//! Threshold proxy re-encryption for sharing data assets through a
//! semi-trusted relayer.
//!
//! ## Overview
//!
//! - **Owner** encrypts once under their own key and issues `n` signed key
//!   fragments for a consumer, any `t` of which suffice.
//! - **Registry** stores the ciphertext, capsule, fragments and a DID-style
//!   metadata document under an asset id.
//! - **Relayer** verifies fragments from the document and re-encrypts the
//!   capsule with them, never seeing a secret key or the plaintext.
//! - **Consumer** decrypts with `t` capsule fragments and their own key,
//!   after an optional token-burn check.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dataproxy::{AllowAllGate, DataProxy, DemoRequest, MemoryStore, ProxyConfig};
//!
//! async fn example() {
//!     let proxy = DataProxy::new(MemoryStore::new(), AllowAllGate, ProxyConfig::default())
//!         .unwrap();
//!
//!     let outcome = proxy.run_demo(&DemoRequest::default()).await.unwrap();
//!     assert_eq!(outcome.plaintext, b"Sample data");
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `dataproxy::core` - Keys, capsules, fragments and the PRE engine
//! - `dataproxy::access` - Metadata documents and the token gate
//! - `dataproxy::store` - The asset registry

pub mod config;
pub mod delegation;
pub mod error;
pub mod proxy;

// Re-export component crates
pub use dataproxy_access as access;
pub use dataproxy_core as core;
pub use dataproxy_store as store;

// Re-export main types for convenience
pub use config::{LogLevel, ProxyConfig};
pub use delegation::{Consumed, Consumer, Delegation, DemoOutcome, DemoRequest, Owner};
pub use error::{ErrorKind, ProxyError, Result};
pub use proxy::DataProxy;

pub use dataproxy_access::{AllowAllGate, MetadataDocument, TokenGate};
pub use dataproxy_core::{AssetId, CapsuleFrag, PublicKey, ThresholdPolicy};
pub use dataproxy_store::{AssetRegistry, AssetStore, MemoryStore};
