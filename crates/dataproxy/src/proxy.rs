//! DataProxy: the delegation workflow over the registry.
//!
//! Owner publishes, the relayer re-encrypts a quorum of fragments, the
//! consumer decrypts. Each step is exposed on its own so callers can run
//! the parties separately; [`DataProxy::run_demo`] chains them.

use std::sync::Arc;

use dataproxy_access::{build_document, TokenGate};
use dataproxy_core::{
    encrypt, generate_kfrags, reencrypt, verify_kfrag, AssetId, CapsuleFrag, PublicKey,
    SecretKey, ThresholdPolicy, VerifiedKeyFrag, VerifyingKey,
};
use dataproxy_store::{AssetRegistry, AssetStore};

use crate::config::ProxyConfig;
use crate::delegation::{Consumed, Consumer, Delegation, DemoOutcome, DemoRequest, Owner};
use crate::error::{ProxyError, Result};

/// The main proxy struct.
///
/// Holds the shared asset registry, the token gate consulted before
/// consumption, and the configuration.
pub struct DataProxy<S: AssetStore, G: TokenGate> {
    registry: Arc<AssetRegistry<S>>,
    gate: G,
    config: ProxyConfig,
}

impl<S: AssetStore, G: TokenGate> DataProxy<S, G> {
    /// Create a proxy over a fresh registry backed by `store`.
    pub fn new(store: S, gate: G, config: ProxyConfig) -> Result<Self> {
        Self::with_registry(Arc::new(AssetRegistry::new(store)), gate, config)
    }

    /// Create a proxy over an existing, possibly shared, registry.
    pub fn with_registry(
        registry: Arc<AssetRegistry<S>>,
        gate: G,
        config: ProxyConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry,
            gate,
            config,
        })
    }

    /// Get the registry.
    pub fn registry(&self) -> &Arc<AssetRegistry<S>> {
        &self.registry
    }

    /// Get the configuration.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Owner
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt `data`, delegate it to `consumer_pk` under the configured
    /// policy, and store the asset.
    pub async fn publish(
        &self,
        owner: &Owner,
        consumer_pk: &PublicKey,
        asset_id: &AssetId,
        data: &[u8],
        access_url: &str,
    ) -> Result<Delegation> {
        let policy = self.config.policy()?;
        self.publish_with_policy(owner, consumer_pk, asset_id, data, access_url, policy)
            .await
    }

    /// Like [`DataProxy::publish`] with an explicit policy.
    pub async fn publish_with_policy(
        &self,
        owner: &Owner,
        consumer_pk: &PublicKey,
        asset_id: &AssetId,
        data: &[u8],
        access_url: &str,
        policy: ThresholdPolicy,
    ) -> Result<Delegation> {
        if data.is_empty() {
            return Err(ProxyError::Validation("data is empty".into()));
        }

        let (ciphertext, capsule) = encrypt(&owner.public_key(), data)?;
        let kfrags = generate_kfrags(
            owner.secret_key(),
            owner.signer(),
            consumer_pk,
            policy.threshold(),
            policy.shares(),
        )?;

        let verifying_key = owner.verifying_key();
        let owner_pk = owner.public_key();
        let verified = kfrags
            .into_iter()
            .map(|kfrag| verify_kfrag(kfrag, &verifying_key, &owner_pk, consumer_pk))
            .collect::<dataproxy_core::Result<Vec<VerifiedKeyFrag>>>()?;

        let document = build_document(
            asset_id,
            access_url,
            owner_pk,
            &ciphertext,
            &capsule,
            &verified,
        )?;

        let delegation = Delegation {
            asset_id: asset_id.clone(),
            document_id: document.id.clone(),
            policy,
            kfrag_ids: verified.iter().map(VerifiedKeyFrag::id).collect(),
        };

        self.registry
            .store_asset(asset_id.clone(), ciphertext, capsule, verified, document)
            .await?;

        tracing::info!(asset = %asset_id, %policy, "published asset");
        Ok(delegation)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Relayer
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-encrypt the capsule of a stored asset with the key fragments at
    /// `selection` (zero-based positions in the document).
    ///
    /// The relayer works from the published document only: every selected
    /// fragment is verified against the owner's keys before use.
    pub async fn relay(
        &self,
        asset_id: &AssetId,
        owner_verifying_key: &VerifyingKey,
        consumer_pk: &PublicKey,
        selection: &[usize],
    ) -> Result<Vec<CapsuleFrag>> {
        let record = self.registry.retrieve(asset_id).await?;
        let document = record.document();
        let capsule = document.capsule()?;
        let owner_pk = document.owner_public_key()?;
        let kfrags = document.kfrags()?;

        let cfrags = selection
            .iter()
            .map(|&position| {
                let kfrag = kfrags
                    .get(position)
                    .cloned()
                    .ok_or(ProxyError::InvalidSelection {
                        position,
                        available: kfrags.len(),
                    })?;
                let verified = verify_kfrag(kfrag, owner_verifying_key, &owner_pk, consumer_pk)?;
                Ok(reencrypt(&capsule, &verified)?)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(asset = %asset_id, cfrags = cfrags.len(), "relayed asset");
        Ok(cfrags)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Consumer
    // ─────────────────────────────────────────────────────────────────────────

    /// Decrypt a stored asset.
    ///
    /// When token burns are required the gate must authorize
    /// `consumer_identity` first.
    pub async fn consume(
        &self,
        asset_id: &AssetId,
        consumer_identity: &str,
        consumer_sk: &SecretKey,
        cfrags: &[CapsuleFrag],
    ) -> Result<Consumed> {
        if self.config.token_burn_required
            && !self
                .gate
                .validate_token_burn(asset_id, consumer_identity)
                .await
        {
            tracing::warn!(
                asset = %asset_id,
                consumer = consumer_identity,
                "token burn not authorized"
            );
            return Err(ProxyError::TokenBurnNotAuthorized {
                asset_id: asset_id.clone(),
                consumer: consumer_identity.to_string(),
            });
        }

        let plaintext = self
            .registry
            .consume(asset_id, consumer_sk, cfrags)
            .await?;
        let record = self.registry.retrieve(asset_id).await?;
        let access_url = record.document().access_url()?.to_string();

        Ok(Consumed {
            plaintext,
            access_url,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // End to end
    // ─────────────────────────────────────────────────────────────────────────

    /// Run the whole flow with freshly generated parties.
    ///
    /// Aborts on the first error. If anything fails after the asset was
    /// stored, the asset is removed again before the error is returned.
    pub async fn run_demo(&self, request: &DemoRequest) -> Result<DemoOutcome> {
        let asset_id = AssetId::new(request.asset_id.clone())?;
        let policy = ThresholdPolicy::new(request.threshold, request.shares)?;

        let owner = Owner::generate();
        let consumer = Consumer::generate("consumer_address");
        tracing::info!(asset = %asset_id, %policy, "running end-to-end demo");

        let delegation = self
            .publish_with_policy(
                &owner,
                &consumer.public_key(),
                &asset_id,
                &request.data,
                &request.access_url,
                policy,
            )
            .await?;

        let selection = request.selection(policy);
        match self.deliver(&owner, &consumer, &asset_id, &selection).await {
            Ok(consumed) => Ok(DemoOutcome {
                delegation,
                plaintext: consumed.plaintext,
                access_url: consumed.access_url,
            }),
            Err(e) => {
                tracing::warn!(asset = %asset_id, kind = %e.kind(), "demo failed, rolling back");
                if let Err(rollback) = self.registry.remove(&asset_id).await {
                    tracing::error!(asset = %asset_id, error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn deliver(
        &self,
        owner: &Owner,
        consumer: &Consumer,
        asset_id: &AssetId,
        selection: &[usize],
    ) -> Result<Consumed> {
        let cfrags = self
            .relay(
                asset_id,
                &owner.verifying_key(),
                &consumer.public_key(),
                selection,
            )
            .await?;
        self.consume(asset_id, consumer.identity(), consumer.secret_key(), &cfrags)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataproxy_access::AllowAllGate;
    use dataproxy_store::MemoryStore;

    use crate::error::ErrorKind;

    fn proxy() -> DataProxy<MemoryStore, AllowAllGate> {
        DataProxy::new(MemoryStore::new(), AllowAllGate, ProxyConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ProxyConfig {
            threshold: 5,
            shares: 3,
            ..ProxyConfig::default()
        };
        let result = DataProxy::new(MemoryStore::new(), AllowAllGate, config);
        assert!(matches!(
            result.map(|_| ()).unwrap_err().kind(),
            ErrorKind::InvalidThreshold
        ));
    }

    #[tokio::test]
    async fn test_publish_uses_configured_policy() {
        let proxy = proxy();
        let owner = Owner::generate();
        let consumer = Consumer::generate("c");
        let asset = AssetId::new("asset-001").unwrap();

        let delegation = proxy
            .publish(
                &owner,
                &consumer.public_key(),
                &asset,
                b"data",
                "https://example.com/data",
            )
            .await
            .unwrap();

        assert_eq!(delegation.policy, ThresholdPolicy::new(2, 3).unwrap());
        assert_eq!(delegation.kfrag_ids.len(), 3);
        assert_eq!(delegation.document_id.as_str(), "did:op:asset-001");
        assert!(proxy.registry().contains(&asset).await.unwrap());
    }

    #[tokio::test]
    async fn test_publish_rejects_empty_data() {
        let proxy = proxy();
        let owner = Owner::generate();
        let consumer = Consumer::generate("c");
        let asset = AssetId::new("asset-001").unwrap();

        let err = proxy
            .publish(&owner, &consumer.public_key(), &asset, b"", "https://example.com/data")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(proxy.registry().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_relay_rejects_wrong_verifying_key() {
        let proxy = proxy();
        let owner = Owner::generate();
        let consumer = Consumer::generate("c");
        let asset = AssetId::new("asset-001").unwrap();
        proxy
            .publish(&owner, &consumer.public_key(), &asset, b"data", "https://example.com/data")
            .await
            .unwrap();

        let impostor = Owner::generate();
        let err = proxy
            .relay(&asset, &impostor.verifying_key(), &consumer.public_key(), &[0, 1])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KfragVerification);
    }

    #[tokio::test]
    async fn test_relay_rejects_out_of_range_selection() {
        let proxy = proxy();
        let owner = Owner::generate();
        let consumer = Consumer::generate("c");
        let asset = AssetId::new("asset-001").unwrap();
        proxy
            .publish(&owner, &consumer.public_key(), &asset, b"data", "https://example.com/data")
            .await
            .unwrap();

        let err = proxy
            .relay(&asset, &owner.verifying_key(), &consumer.public_key(), &[0, 7])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::InvalidSelection {
                position: 7,
                available: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_demo_rolls_back_on_failure() {
        let proxy = proxy();
        let request = DemoRequest {
            selection: Some(vec![1]),
            ..DemoRequest::default()
        };

        let err = proxy.run_demo(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientFragments);
        assert!(proxy.registry().is_empty().await.unwrap());
    }
}
