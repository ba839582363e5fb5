//! Shared fixtures for the store's unit tests.

use dataproxy_access::{build_document, MetadataDocument};
use dataproxy_core::{
    encrypt, generate_kfrags, AssetId, Capsule, Keypair, SigningKeypair, VerifiedKeyFrag,
};

/// The artifacts of one publish step, ready to be stored.
pub(crate) struct Published {
    pub asset_id: AssetId,
    pub owner: Keypair,
    pub consumer: Keypair,
    pub ciphertext: Vec<u8>,
    pub capsule: Capsule,
    pub kfrags: Vec<VerifiedKeyFrag>,
    pub document: MetadataDocument,
}

impl Published {
    pub fn new(asset_id: &str, plaintext: &[u8], threshold: u16, shares: u16) -> Self {
        let owner = Keypair::generate();
        let signer = SigningKeypair::generate();
        let consumer = Keypair::generate();
        let asset_id = AssetId::new(asset_id).unwrap();

        let (ciphertext, capsule) = encrypt(&owner.public_key(), plaintext).unwrap();
        let kfrags: Vec<_> = generate_kfrags(
            owner.secret_key(),
            &signer,
            &consumer.public_key(),
            threshold,
            shares,
        )
        .unwrap()
        .into_iter()
        .map(|k| {
            k.verify(
                &signer.verifying_key(),
                &owner.public_key(),
                &consumer.public_key(),
            )
            .unwrap()
        })
        .collect();
        let document = build_document(
            &asset_id,
            "https://example.com/data",
            owner.public_key(),
            &ciphertext,
            &capsule,
            &kfrags,
        )
        .unwrap();

        Self {
            asset_id,
            owner,
            consumer,
            ciphertext,
            capsule,
            kfrags,
            document,
        }
    }
}
