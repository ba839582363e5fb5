//! # Data Proxy Access
//!
//! Asset metadata documents and the token gate in front of consumption.
//!
//! ## Overview
//!
//! Every published asset is described by a [`MetadataDocument`]: a
//! DID-style JSON record that carries the access URL, the owner's public
//! key, and hex encodings of the ciphertext, capsule and key fragments.
//! Documents hold public material only.
//!
//! Consumption can be gated on a token burn through the [`TokenGate`]
//! trait. [`AllowAllGate`] authorizes everything.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dataproxy_access::{build_document, MetadataDocument};
//!
//! // let doc = build_document(&asset_id, "https://example.com/data",
//! //     owner.public_key(), &ciphertext, &capsule, &verified_kfrags)?;
//! // let json = doc.to_json()?;
//! // let doc = MetadataDocument::from_json(&json)?;
//! ```

pub mod document;
pub mod error;
pub mod gate;

pub use document::{
    build_document, AccessEntry, DocumentBuilder, DocumentId, EncryptionInfo, MetadataDocument,
    ACCESS_TYPE_REST, DID_CONTEXT_URL, DID_METHOD, ENCRYPTION_TYPE,
};
pub use error::{AccessError, Result};
pub use gate::{AllowAllGate, TokenGate};
