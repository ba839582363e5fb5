//! # Data Proxy Testkit
//!
//! Testing utilities for the data proxy.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Ready-made delegations, a refusing token gate, and
//!   in-memory proxies
//! - **Generators**: Proptest strategies for policies, plaintexts and ids
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use dataproxy_testkit::generators::{plaintext, policy};
//!
//! proptest! {
//!     #[test]
//!     fn roundtrip(policy in policy(5), data in plaintext(256)) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use dataproxy_testkit::fixtures::DelegationFixture;
//!
//! let fixture = DelegationFixture::new(2, 3);
//! let (ciphertext, capsule) = fixture.encrypt(b"Sample data");
//! let cfrags = fixture.cfrags(&capsule, &[0, 2]);
//! assert_eq!(fixture.decrypt(&capsule, &cfrags, &ciphertext).unwrap(), b"Sample data");
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{combinations, memory_proxy, DelegationFixture, DenyAllGate};
