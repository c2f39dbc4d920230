//! Typed request bodies and response shapes for the bridge routes.
//!
//! Requests are validated at the boundary: unknown or missing fields are
//! rejected before any handler runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `/v1/auth/request` and `/v1/auth/test`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthRequest {
    #[serde(default = "default_client")]
    pub client: String,
    #[serde(default = "default_purpose")]
    pub purpose: String,
    #[serde(default = "default_rev")]
    pub rev: u32,
}

fn default_client() -> String {
    "browser".to_string()
}

fn default_purpose() -> String {
    "vaults-access".to_string()
}

fn default_rev() -> u32 {
    1
}

impl Default for AuthRequest {
    fn default() -> Self {
        Self {
            client: default_client(),
            purpose: default_purpose(),
            rev: default_rev(),
        }
    }
}

/// Body of `/v1/auth/response`: the code shown to the user, the
/// browser's identifier and its public key as a JWK JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthResponse {
    pub code: String,
    pub id: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// Query of `GET /v1/entries`, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EntriesQuery {
    Term(TermQuery),
    Url(UrlQuery),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TermQuery {
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrlQuery {
    pub url: String,
}

/// One `(entry, source)` reference in `/v1/entries/specific`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryRef {
    #[serde(rename = "entryID")]
    pub entry_id: String,
    #[serde(rename = "sourceID")]
    pub source_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecificSearch {
    pub entries: Vec<EntryRef>,
}

/// Body of `/v1/vaults/{id}/group/{gid}/entry`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    pub properties: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PairingAccepted {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

/// A store entry as the browser extension sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub entry_type: &'static str,
    #[serde(rename = "groupID")]
    pub group_id: &'static str,
    pub id: String,
    pub properties: ItemProperties,
    pub tags: Vec<String>,
    #[serde(rename = "sourceID")]
    pub source_id: String,
    #[serde(rename = "vaultID")]
    pub vault_id: String,
    pub urls: Vec<String>,
}

/// Secret properties are only present while the store is open.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemProperties {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "Note")]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<Item>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Otp {
    #[serde(rename = "sourceID")]
    pub source_id: String,
    #[serde(rename = "entryID")]
    pub entry_id: String,
    pub entry_property: &'static str,
    pub entry_title: String,
    #[serde(rename = "loginURL")]
    pub login_url: Option<String>,
    #[serde(rename = "otpURL")]
    pub otp_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OtpList {
    pub otps: Vec<Otp>,
}

#[derive(Debug, Serialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub state: &'static str,
    #[serde(rename = "type")]
    pub source_type: &'static str,
    pub order: u32,
    pub format: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SourceList {
    pub sources: Vec<Source>,
}

#[derive(Debug, Serialize)]
pub struct SavedEntry {
    #[serde(rename = "entryID")]
    pub entry_id: String,
}
