//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use async_trait::async_trait;

use dataproxy::{DataProxy, ProxyConfig};
use dataproxy_access::TokenGate;
use dataproxy_core::{
    decrypt, encrypt, generate_kfrags, reencrypt, AssetId, Capsule, CapsuleFrag, KeyFrag,
    Keypair, SigningKeypair, ThresholdPolicy, VerifiedKeyFrag,
};
use dataproxy_store::MemoryStore;

/// One delegation from a fresh owner to a fresh consumer.
pub struct DelegationFixture {
    pub owner: Keypair,
    pub signer: SigningKeypair,
    pub consumer: Keypair,
    pub policy: ThresholdPolicy,
    /// The fragments as issued, not yet verified.
    pub kfrags: Vec<KeyFrag>,
}

impl DelegationFixture {
    /// Create a `threshold`-of-`shares` delegation with random keys.
    pub fn new(threshold: u16, shares: u16) -> Self {
        Self::with_signer(threshold, shares, SigningKeypair::generate())
    }

    /// Create a delegation signed by a given signing keypair.
    pub fn with_signer(threshold: u16, shares: u16, signer: SigningKeypair) -> Self {
        let owner = Keypair::generate();
        let consumer = Keypair::generate();
        let policy = ThresholdPolicy::new(threshold, shares).expect("valid policy");
        let kfrags = generate_kfrags(
            owner.secret_key(),
            &signer,
            &consumer.public_key(),
            threshold,
            shares,
        )
        .expect("kfrag generation");

        Self {
            owner,
            signer,
            consumer,
            policy,
            kfrags,
        }
    }

    /// Verify one fragment against this delegation's keys.
    pub fn verify(&self, kfrag: KeyFrag) -> dataproxy_core::Result<VerifiedKeyFrag> {
        kfrag.verify(
            &self.signer.verifying_key(),
            &self.owner.public_key(),
            &self.consumer.public_key(),
        )
    }

    /// All fragments, verified.
    pub fn verified(&self) -> Vec<VerifiedKeyFrag> {
        self.kfrags
            .iter()
            .cloned()
            .map(|k| self.verify(k).expect("issued fragment verifies"))
            .collect()
    }

    /// Encrypt under the owner's key.
    pub fn encrypt(&self, plaintext: &[u8]) -> (Vec<u8>, Capsule) {
        encrypt(&self.owner.public_key(), plaintext).expect("encryption")
    }

    /// Re-encrypt `capsule` with the fragments at `positions`.
    pub fn cfrags(&self, capsule: &Capsule, positions: &[usize]) -> Vec<CapsuleFrag> {
        let verified = self.verified();
        positions
            .iter()
            .map(|&i| reencrypt(capsule, &verified[i]).expect("re-encryption"))
            .collect()
    }

    /// Decrypt as the consumer.
    pub fn decrypt(
        &self,
        capsule: &Capsule,
        cfrags: &[CapsuleFrag],
        ciphertext: &[u8],
    ) -> dataproxy_core::Result<Vec<u8>> {
        decrypt(self.consumer.secret_key(), capsule, cfrags, ciphertext)
    }
}

/// Token gate that refuses every consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllGate;

#[async_trait]
impl TokenGate for DenyAllGate {
    async fn validate_token_burn(&self, _asset_id: &AssetId, _consumer_identity: &str) -> bool {
        false
    }
}

/// A proxy over a fresh in-memory registry.
pub fn memory_proxy<G: TokenGate>(gate: G, config: ProxyConfig) -> DataProxy<MemoryStore, G> {
    DataProxy::new(MemoryStore::new(), gate, config).expect("valid proxy config")
}

/// Every `k`-element subset of `0..n`, as sorted position lists.
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    fn extend(
        start: usize,
        n: usize,
        k: usize,
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..n {
            current.push(i);
            extend(i + 1, n, k, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    extend(0, n, k, &mut Vec::with_capacity(k), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataproxy::ErrorKind;
    use dataproxy::{Consumer, Owner};

    #[test]
    fn test_combinations() {
        assert_eq!(combinations(3, 2), vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
        assert_eq!(combinations(4, 4).len(), 1);
        assert_eq!(combinations(5, 2).len(), 10);
        assert_eq!(combinations(2, 0), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_fixture_roundtrip() {
        let fixture = DelegationFixture::new(2, 3);
        let (ciphertext, capsule) = fixture.encrypt(b"fixture");
        let cfrags = fixture.cfrags(&capsule, &[0, 2]);
        assert_eq!(fixture.decrypt(&capsule, &cfrags, &ciphertext).unwrap(), b"fixture");
    }

    #[tokio::test]
    async fn test_deny_all_gate_blocks_consumption() {
        let config = ProxyConfig {
            token_burn_required: true,
            ..ProxyConfig::default()
        };
        let proxy = memory_proxy(DenyAllGate, config);
        let owner = Owner::generate();
        let consumer = Consumer::generate("c");
        let asset = AssetId::new("asset-001").unwrap();

        proxy
            .publish(&owner, &consumer.public_key(), &asset, b"data", "https://example.com/data")
            .await
            .unwrap();
        let err = proxy
            .consume(&asset, consumer.identity(), consumer.secret_key(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TokenBurnNotAuthorized);
    }
}
