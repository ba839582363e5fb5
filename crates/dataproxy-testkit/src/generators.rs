//! Proptest generators for property-based testing.

use proptest::prelude::*;

use dataproxy_core::{AssetId, SigningKeypair, ThresholdPolicy};

/// Generate a signing keypair from a random seed.
pub fn signing_keypair() -> impl Strategy<Value = SigningKeypair> {
    any::<[u8; 32]>().prop_map(|seed| SigningKeypair::from_seed(&seed))
}

/// Generate a valid `t`-of-`n` policy with `n <= max_shares`.
pub fn policy(max_shares: u16) -> impl Strategy<Value = ThresholdPolicy> {
    (1..=max_shares.max(1))
        .prop_flat_map(|n| (1..=n, Just(n)))
        .prop_map(|(t, n)| ThresholdPolicy::new(t, n).expect("1 <= t <= n"))
}

/// Generate a policy with `t >= 2`, so a below-threshold subset exists.
pub fn multi_share_policy(max_shares: u16) -> impl Strategy<Value = ThresholdPolicy> {
    policy(max_shares.max(2)).prop_filter("threshold of at least two", |p| p.threshold() >= 2)
}

/// Generate a `(t, n)` pair violating `1 <= t <= n`.
pub fn invalid_policy() -> impl Strategy<Value = (u16, u16)> {
    prop_oneof![
        (0u16..=8).prop_map(|n| (0, n)),
        (1u16..=8).prop_flat_map(|n| ((n + 1)..=(n + 8), Just(n))),
    ]
}

/// Generate a non-empty plaintext of at most `max_len` bytes.
pub fn plaintext(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len.max(1))
}

/// Generate an asset identifier.
pub fn asset_id() -> impl Strategy<Value = AssetId> {
    "[a-z][a-z0-9-]{0,15}".prop_map(|s| AssetId::new(s).expect("non-blank id"))
}
