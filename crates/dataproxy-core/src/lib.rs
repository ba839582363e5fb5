//! # Data Proxy Core
//!
//! Pure primitives for threshold proxy re-encryption: key material,
//! capsules, signed key fragments and capsule fragments.
//!
//! This crate contains no I/O and no storage. It is pure computation over
//! cryptographic values.
//!
//! ## Flow
//!
//! 1. The owner [`encrypt`]s under her own public key and gets a
//!    ciphertext plus a [`Capsule`].
//! 2. The owner runs [`generate_kfrags`] for a consumer under a `(t, n)`
//!    [`ThresholdPolicy`]; every [`KeyFrag`] is signed.
//! 3. A relayer turns each fragment into a [`VerifiedKeyFrag`] with
//!    [`verify_kfrag`], then calls [`reencrypt`] to get a [`CapsuleFrag`].
//! 4. The consumer [`decrypt`]s with any `t` capsule fragments.
//!
//! [`reencrypt`] only accepts [`VerifiedKeyFrag`], so passing an unverified
//! fragment is a compile-time error.
//!
//! ## Usage
//!
//! ```rust
//! use dataproxy_core::{
//!     decrypt, encrypt, generate_kfrags, generate_keypair, generate_signing_keypair,
//!     reencrypt, verify_kfrag,
//! };
//!
//! let owner = generate_keypair();
//! let signer = generate_signing_keypair();
//! let consumer = generate_keypair();
//!
//! let (ciphertext, capsule) = encrypt(&owner.public_key(), b"Sample data").unwrap();
//! let kfrags = generate_kfrags(
//!     owner.secret_key(), &signer, &consumer.public_key(), 2, 3,
//! ).unwrap();
//!
//! let cfrags: Vec<_> = kfrags
//!     .into_iter()
//!     .take(2)
//!     .map(|kfrag| {
//!         let verified = verify_kfrag(
//!             kfrag, &signer.verifying_key(), &owner.public_key(), &consumer.public_key(),
//!         ).unwrap();
//!         reencrypt(&capsule, &verified).unwrap()
//!     })
//!     .collect();
//!
//! let plaintext = decrypt(consumer.secret_key(), &capsule, &cfrags, &ciphertext).unwrap();
//! assert_eq!(plaintext, b"Sample data");
//! ```

mod codec;
mod curve;
mod dem;

pub mod capsule;
pub mod cfrag;
pub mod error;
pub mod keys;
pub mod kfrag;
pub mod pre;
pub mod types;

pub use capsule::{Capsule, CapsuleDigest};
pub use cfrag::{reencrypt, CapsuleFrag};
pub use ed25519_dalek::Signature;
pub use error::{PreError, Result};
pub use keys::{
    generate_keypair, generate_signing_keypair, Keypair, PublicKey, SecretKey, SigningKeypair,
    VerifyingKey,
};
pub use kfrag::{generate_kfrags, verify_kfrag, KeyFrag, VerifiedKeyFrag};
pub use pre::{decrypt, decrypt_original, encrypt};
pub use types::{AssetId, InvalidAssetId, KeyFragId, ThresholdPolicy};
