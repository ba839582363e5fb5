//! The parties and the values that flow between them.

use dataproxy_access::DocumentId;
use dataproxy_core::{
    AssetId, KeyFragId, Keypair, PublicKey, SecretKey, SigningKeypair, ThresholdPolicy,
    VerifyingKey,
};

/// The data owner: an encryption keypair plus the signing keypair that
/// authenticates key fragments.
#[derive(Debug)]
pub struct Owner {
    keypair: Keypair,
    signer: SigningKeypair,
}

impl Owner {
    /// Generate fresh owner keys.
    pub fn generate() -> Self {
        Self::from_parts(Keypair::generate(), SigningKeypair::generate())
    }

    pub fn from_parts(keypair: Keypair, signer: SigningKeypair) -> Self {
        Self { keypair, signer }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Key that verifies this owner's key fragments.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signer.verifying_key()
    }

    pub fn secret_key(&self) -> &SecretKey {
        self.keypair.secret_key()
    }

    pub fn signer(&self) -> &SigningKeypair {
        &self.signer
    }
}

/// A data consumer: an identity the token gate knows plus a keypair.
#[derive(Debug)]
pub struct Consumer {
    identity: String,
    keypair: Keypair,
}

impl Consumer {
    /// Generate a fresh keypair for `identity`.
    pub fn generate(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            keypair: Keypair::generate(),
        }
    }

    /// The consumer's identity, e.g. an on-chain address.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    pub fn secret_key(&self) -> &SecretKey {
        self.keypair.secret_key()
    }
}

/// Summary of a published delegation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub asset_id: AssetId,
    pub document_id: DocumentId,
    pub policy: ThresholdPolicy,
    /// Ids of the issued key fragments, in issue order.
    pub kfrag_ids: Vec<KeyFragId>,
}

/// What a successful consumption hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumed {
    pub plaintext: Vec<u8>,
    pub access_url: String,
}

/// Parameters of one end-to-end demo run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoRequest {
    pub data: Vec<u8>,
    pub asset_id: String,
    pub access_url: String,
    pub threshold: u16,
    pub shares: u16,
    /// Positions of the key fragments to relay. `None` relays the first
    /// `threshold` fragments.
    pub selection: Option<Vec<usize>>,
}

impl Default for DemoRequest {
    fn default() -> Self {
        Self {
            data: b"Sample data".to_vec(),
            asset_id: "asset-001".to_string(),
            access_url: "https://example.com/data".to_string(),
            threshold: 2,
            shares: 3,
            selection: None,
        }
    }
}

impl DemoRequest {
    pub(crate) fn selection(&self, policy: ThresholdPolicy) -> Vec<usize> {
        self.selection
            .clone()
            .unwrap_or_else(|| (0..usize::from(policy.threshold())).collect())
    }
}

/// Result of a demo run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOutcome {
    pub delegation: Delegation,
    pub plaintext: Vec<u8>,
    pub access_url: String,
}
