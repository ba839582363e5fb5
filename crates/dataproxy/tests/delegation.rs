//! End-to-end delegation scenarios through the public proxy API.

use std::sync::Arc;

use proptest::prelude::*;

use dataproxy::{
    AllowAllGate, AssetId, Consumer, DataProxy, DemoRequest, ErrorKind, MemoryStore, Owner,
    ProxyConfig,
};
use dataproxy_testkit::{memory_proxy, DenyAllGate};

const ACCESS_URL: &str = "https://example.com/data";

fn proxy() -> DataProxy<MemoryStore, AllowAllGate> {
    memory_proxy(AllowAllGate, ProxyConfig::default())
}

fn asset() -> AssetId {
    AssetId::new("asset-001").unwrap()
}

#[tokio::test]
async fn two_of_three_with_first_and_third_fragment() {
    let proxy = proxy();
    let owner = Owner::generate();
    let consumer = Consumer::generate("consumer_address");

    proxy
        .publish(&owner, &consumer.public_key(), &asset(), b"Sample data", ACCESS_URL)
        .await
        .unwrap();

    let cfrags = proxy
        .relay(&asset(), &owner.verifying_key(), &consumer.public_key(), &[0, 2])
        .await
        .unwrap();
    let consumed = proxy
        .consume(&asset(), consumer.identity(), consumer.secret_key(), &cfrags)
        .await
        .unwrap();

    assert_eq!(consumed.plaintext, b"Sample data");
    assert_eq!(consumed.access_url, ACCESS_URL);
}

#[tokio::test]
async fn single_fragment_is_insufficient() {
    let proxy = proxy();
    let owner = Owner::generate();
    let consumer = Consumer::generate("consumer_address");

    proxy
        .publish(&owner, &consumer.public_key(), &asset(), b"Sample data", ACCESS_URL)
        .await
        .unwrap();

    let cfrags = proxy
        .relay(&asset(), &owner.verifying_key(), &consumer.public_key(), &[1])
        .await
        .unwrap();
    let err = proxy
        .consume(&asset(), consumer.identity(), consumer.secret_key(), &cfrags)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientFragments);
}

#[tokio::test]
async fn duplicate_publish_keeps_first_asset() {
    let proxy = proxy();
    let owner = Owner::generate();
    let consumer = Consumer::generate("consumer_address");

    proxy
        .publish(&owner, &consumer.public_key(), &asset(), b"first", ACCESS_URL)
        .await
        .unwrap();
    let before = proxy.registry().retrieve(&asset()).await.unwrap();

    let err = proxy
        .publish(&owner, &consumer.public_key(), &asset(), b"second", ACCESS_URL)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateAsset);

    let after = proxy.registry().retrieve(&asset()).await.unwrap();
    assert_eq!(before, after);

    let cfrags = proxy
        .relay(&asset(), &owner.verifying_key(), &consumer.public_key(), &[0, 1])
        .await
        .unwrap();
    let consumed = proxy
        .consume(&asset(), consumer.identity(), consumer.secret_key(), &cfrags)
        .await
        .unwrap();
    assert_eq!(consumed.plaintext, b"first");
}

#[tokio::test]
async fn other_consumer_cannot_use_relayed_fragments() {
    let proxy = proxy();
    let owner = Owner::generate();
    let consumer = Consumer::generate("bob");
    let eve = Consumer::generate("eve");

    proxy
        .publish(&owner, &consumer.public_key(), &asset(), b"Sample data", ACCESS_URL)
        .await
        .unwrap();

    // Fragments were issued for bob, so relaying them to eve fails verification.
    let err = proxy
        .relay(&asset(), &owner.verifying_key(), &eve.public_key(), &[0, 1])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::KfragVerification);

    // Bob's capsule fragments do not open for eve's key.
    let cfrags = proxy
        .relay(&asset(), &owner.verifying_key(), &consumer.public_key(), &[0, 1])
        .await
        .unwrap();
    let err = proxy
        .consume(&asset(), eve.identity(), eve.secret_key(), &cfrags)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decryption);
}

#[tokio::test]
async fn token_gate_is_consulted_when_required() {
    let config = ProxyConfig {
        token_burn_required: true,
        ..ProxyConfig::default()
    };
    let proxy = memory_proxy(DenyAllGate, config);
    let owner = Owner::generate();
    let consumer = Consumer::generate("consumer_address");

    proxy
        .publish(&owner, &consumer.public_key(), &asset(), b"Sample data", ACCESS_URL)
        .await
        .unwrap();
    let cfrags = proxy
        .relay(&asset(), &owner.verifying_key(), &consumer.public_key(), &[0, 1])
        .await
        .unwrap();

    let err = proxy
        .consume(&asset(), consumer.identity(), consumer.secret_key(), &cfrags)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenBurnNotAuthorized);

    let record = proxy.registry().retrieve(&asset()).await.unwrap();
    assert_eq!(record.consumptions(), 0);
}

#[tokio::test]
async fn token_gate_is_skipped_when_not_required() {
    let proxy = memory_proxy(DenyAllGate, ProxyConfig::default());
    let outcome = proxy.run_demo(&DemoRequest::default()).await.unwrap();
    assert_eq!(outcome.plaintext, b"Sample data");
}

#[tokio::test]
async fn demo_reports_plaintext_and_access_url() {
    let proxy = proxy();
    let outcome = proxy.run_demo(&DemoRequest::default()).await.unwrap();

    assert_eq!(outcome.plaintext, b"Sample data");
    assert_eq!(outcome.access_url, ACCESS_URL);
    assert_eq!(outcome.delegation.kfrag_ids.len(), 3);
    assert_eq!(outcome.delegation.document_id.as_str(), "did:op:asset-001");
}

#[tokio::test]
async fn demo_with_bad_policy_stores_nothing() {
    let proxy = proxy();
    let request = DemoRequest {
        threshold: 4,
        shares: 3,
        ..DemoRequest::default()
    };

    let err = proxy.run_demo(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidThreshold);
    assert!(proxy.registry().is_empty().await.unwrap());
}

#[tokio::test]
async fn shared_registry_sees_published_assets() {
    let first = proxy();
    let second =
        DataProxy::with_registry(Arc::clone(first.registry()), AllowAllGate, ProxyConfig::default())
            .unwrap();

    first.run_demo(&DemoRequest::default()).await.unwrap();
    let err = second.run_demo(&DemoRequest::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateAsset);
    assert_eq!(second.registry().len().await.unwrap(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn demo_succeeds_for_any_threshold_subset(
        (shares, threshold, positions) in (1u16..=4)
            .prop_flat_map(|n| (Just(n), 1..=n))
            .prop_flat_map(|(n, t)| {
                let all: Vec<usize> = (0..usize::from(n)).collect();
                (Just(n), Just(t), Just(all).prop_shuffle())
            })
            .prop_map(|(n, t, mut positions)| {
                positions.truncate(usize::from(t));
                (n, t, positions)
            }),
    ) {
        let request = DemoRequest {
            threshold,
            shares,
            selection: Some(positions),
            ..DemoRequest::default()
        };
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let outcome = runtime.block_on(proxy().run_demo(&request)).unwrap();
        prop_assert_eq!(outcome.plaintext, b"Sample data".to_vec());
    }
}
