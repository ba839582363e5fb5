//! Asset metadata documents.
//!
//! Every stored asset gets one self-describing, DID-style document that
//! embeds the ciphertext, the capsule and the key fragments in hex, next to
//! the access URL and the owner's public key. The document id is derived
//! from the asset id alone, so two builds for the same asset share an
//! identity even though their artifacts differ.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use dataproxy_core::{AssetId, Capsule, KeyFrag, PublicKey, VerifiedKeyFrag};

use crate::error::{AccessError, Result};

/// JSON-LD context of every document.
pub const DID_CONTEXT_URL: &str = "https://w3id.org/did/v1";

/// DID method namespace for asset documents.
pub const DID_METHOD: &str = "op";

/// Access entry type for plain REST retrieval.
pub const ACCESS_TYPE_REST: &str = "rest";

/// Encryption scheme tag.
pub const ENCRYPTION_TYPE: &str = "Umbral-Ristretto255";

/// Identifier of a metadata document: `did:op:<asset_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derive the document id for an asset.
    pub fn for_asset(asset_id: &AssetId) -> Self {
        Self(format!("did:{}:{}", DID_METHOD, asset_id))
    }

    /// The asset id this document id was derived from, if well-formed.
    pub fn asset_id(&self) -> Option<AssetId> {
        let prefix = format!("did:{}:", DID_METHOD);
        self.0
            .strip_prefix(&prefix)
            .and_then(|id| AssetId::new(id).ok())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How and where the encrypted asset can be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEntry {
    /// Access mechanism, currently always `rest`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Where the consumer retrieves the data.
    pub access_url: Url,

    /// Ciphertext, hex encoded.
    pub data: String,

    /// Capsule, hex encoded.
    pub capsule: String,

    /// Key fragments, hex encoded.
    pub kfrags: Vec<String>,
}

/// Encryption scheme and owner key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionInfo {
    /// Scheme tag.
    #[serde(rename = "type")]
    pub kind: String,

    /// Owner public key, hex encoded.
    pub public_key: String,
}

/// A self-describing identity record for one asset.
///
/// Read-only once built. Holds public material only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    #[serde(rename = "@context")]
    pub context: String,

    pub id: DocumentId,

    pub created: DateTime<Utc>,

    pub access: Vec<AccessEntry>,

    pub encryption: EncryptionInfo,
}

impl MetadataDocument {
    /// The primary access entry.
    pub fn primary_access(&self) -> Result<&AccessEntry> {
        self.access
            .first()
            .ok_or_else(|| AccessError::Validation("document has no access entry".into()))
    }

    /// Where the asset can be retrieved.
    pub fn access_url(&self) -> Result<&Url> {
        Ok(&self.primary_access()?.access_url)
    }

    /// Decode the embedded ciphertext.
    pub fn ciphertext(&self) -> Result<Vec<u8>> {
        hex::decode(&self.primary_access()?.data)
            .map_err(|e| AccessError::Serialization(format!("ciphertext: {}", e)))
    }

    /// Decode the embedded capsule.
    pub fn capsule(&self) -> Result<Capsule> {
        Ok(Capsule::from_hex(&self.primary_access()?.capsule)?)
    }

    /// Decode the embedded key fragments.
    ///
    /// They come back unverified: whoever reads them from a document must
    /// verify them before re-encrypting.
    pub fn kfrags(&self) -> Result<Vec<KeyFrag>> {
        self.primary_access()?
            .kfrags
            .iter()
            .map(|hex| KeyFrag::from_hex(hex).map_err(AccessError::from))
            .collect()
    }

    /// Decode the owner's public key.
    pub fn owner_public_key(&self) -> Result<PublicKey> {
        Ok(PublicKey::from_hex(&self.encryption.public_key)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AccessError::Serialization(e.to_string()))
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AccessError::Serialization(e.to_string()))
    }
}

/// Builder for [`MetadataDocument`].
///
/// Every field is required; [`DocumentBuilder::build`] reports the first
/// missing or malformed one as a validation error.
#[derive(Default)]
pub struct DocumentBuilder<'a> {
    asset_id: Option<&'a AssetId>,
    access_url: Option<&'a str>,
    owner_key: Option<PublicKey>,
    ciphertext: Option<&'a [u8]>,
    capsule: Option<&'a Capsule>,
    kfrags: Option<&'a [VerifiedKeyFrag]>,
}

impl<'a> DocumentBuilder<'a> {
    /// Start building a document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the asset the document describes.
    pub fn asset_id(mut self, asset_id: &'a AssetId) -> Self {
        self.asset_id = Some(asset_id);
        self
    }

    /// Set the REST endpoint the asset is served from.
    pub fn access_url(mut self, url: &'a str) -> Self {
        self.access_url = Some(url);
        self
    }

    /// Set the owner's public key.
    pub fn owner_key(mut self, key: PublicKey) -> Self {
        self.owner_key = Some(key);
        self
    }

    /// Set the encrypted asset.
    pub fn ciphertext(mut self, ciphertext: &'a [u8]) -> Self {
        self.ciphertext = Some(ciphertext);
        self
    }

    /// Set the capsule produced alongside the ciphertext.
    pub fn capsule(mut self, capsule: &'a Capsule) -> Self {
        self.capsule = Some(capsule);
        self
    }

    /// Set the delegation's key fragments, in issue order.
    pub fn kfrags(mut self, kfrags: &'a [VerifiedKeyFrag]) -> Self {
        self.kfrags = Some(kfrags);
        self
    }

    /// Validate all fields and build the document.
    pub fn build(self) -> Result<MetadataDocument> {
        let asset_id = self.asset_id.ok_or_else(|| missing("data asset ID"))?;

        let access_url = self
            .access_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| missing("access URL"))?;
        let access_url = Url::parse(access_url)
            .map_err(|e| AccessError::Validation(format!("invalid access URL: {}", e)))?;

        let owner_key = self.owner_key.ok_or_else(|| missing("owner public key"))?;

        let ciphertext = self
            .ciphertext
            .filter(|c| !c.is_empty())
            .ok_or_else(|| missing("ciphertext"))?;

        let capsule = self.capsule.ok_or_else(|| missing("capsule"))?;
        if !capsule.verify() {
            return Err(AccessError::Validation("invalid capsule".into()));
        }

        let kfrags = self
            .kfrags
            .filter(|k| !k.is_empty())
            .ok_or_else(|| missing("key fragments"))?;
        if kfrags.iter().any(|k| k.delegating_key() != owner_key) {
            return Err(AccessError::Validation(
                "key fragments were not issued by the owner key".into(),
            ));
        }

        let document = MetadataDocument {
            context: DID_CONTEXT_URL.to_string(),
            id: DocumentId::for_asset(asset_id),
            created: Utc::now(),
            access: vec![AccessEntry {
                kind: ACCESS_TYPE_REST.to_string(),
                access_url,
                data: hex::encode(ciphertext),
                capsule: capsule.to_hex(),
                kfrags: kfrags.iter().map(|k| hex::encode(k.to_bytes())).collect(),
            }],
            encryption: EncryptionInfo {
                kind: ENCRYPTION_TYPE.to_string(),
                public_key: owner_key.to_hex(),
            },
        };

        tracing::debug!(id = %document.id, "created metadata document");
        Ok(document)
    }
}

fn missing(field: &str) -> AccessError {
    AccessError::Validation(format!("{} is missing", field))
}

/// Build a metadata document in one call.
pub fn build_document(
    asset_id: &AssetId,
    access_url: &str,
    owner_key: PublicKey,
    ciphertext: &[u8],
    capsule: &Capsule,
    kfrags: &[VerifiedKeyFrag],
) -> Result<MetadataDocument> {
    DocumentBuilder::new()
        .asset_id(asset_id)
        .access_url(access_url)
        .owner_key(owner_key)
        .ciphertext(ciphertext)
        .capsule(capsule)
        .kfrags(kfrags)
        .build()
}
