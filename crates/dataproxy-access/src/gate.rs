//! Token gate: the pluggable check run before an asset may be consumed.
//!
//! The proxy asks the gate whether a consumer has burned the access token
//! for an asset. The gate is opaque to the rest of the system, which must
//! not infer anything from a `true` answer beyond "consumption may go
//! ahead".

use async_trait::async_trait;

use dataproxy_core::AssetId;

/// Authorizes consumption of an asset.
#[async_trait]
pub trait TokenGate: Send + Sync {
    /// Whether `consumer_identity` has burned the token for `asset_id`.
    async fn validate_token_burn(&self, asset_id: &AssetId, consumer_identity: &str) -> bool;
}

/// Gate that authorizes every request.
///
/// Stands in for an on-chain check in demos and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllGate;

#[async_trait]
impl TokenGate for AllowAllGate {
    async fn validate_token_burn(&self, asset_id: &AssetId, consumer_identity: &str) -> bool {
        tracing::debug!(
            asset = %asset_id,
            consumer = consumer_identity,
            "token burn accepted without on-chain check"
        );
        true
    }
}

#[async_trait]
impl<G: TokenGate + ?Sized> TokenGate for std::sync::Arc<G> {
    async fn validate_token_burn(&self, asset_id: &AssetId, consumer_identity: &str) -> bool {
        (**self).validate_token_burn(asset_id, consumer_identity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_allow_all_gate() {
        let asset = AssetId::new("asset-001").unwrap();
        assert!(AllowAllGate.validate_token_burn(&asset, "consumer").await);
    }

    #[tokio::test]
    async fn test_gate_behind_arc() {
        let gate: Arc<dyn TokenGate> = Arc::new(AllowAllGate);
        let asset = AssetId::new("asset-001").unwrap();
        assert!(gate.validate_token_burn(&asset, "").await);
    }
}
