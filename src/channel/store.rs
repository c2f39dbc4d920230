//! Persistent bridge configuration: our key pair and paired browsers.
//!
//! Stored as pretty JSON:
//!
//! ```json
//! {
//!   "browserPrivateKey": { "kty": "EC", "crv": "P-256", "x": "…", "y": "…", "d": "…" },
//!   "browserPublicKey":  { "kty": "EC", "crv": "P-256", "x": "…", "y": "…" },
//!   "browserClients":    { "<peer id>": { "kty": "EC", … } }
//! }
//! ```
//!
//! The file is rewritten atomically after every change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use p256::elliptic_curve::JwkEcKey;
use p256::{NistP256, PublicKey, SecretKey};
use serde::{Deserialize, Serialize};

use crate::errors::{KitsupassError, Result};
use crate::vault::format::write_atomic;

use super::keys;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    browser_private_key: Option<JwkEcKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    browser_public_key: Option<JwkEcKey>,

    #[serde(default)]
    browser_clients: BTreeMap<String, JwkEcKey>,
}

/// Load-on-start, save-on-change store for the bridge's key material.
#[derive(Debug)]
pub struct ChannelStore {
    /// `None` for a store that lives only in memory.
    path: Option<PathBuf>,
    config: ChannelConfig,
}

impl ChannelStore {
    /// Load the store at `path`; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            serde_json::from_str(&contents).map_err(|e| {
                KitsupassError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
            })?
        } else {
            ChannelConfig::default()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            config,
        })
    }

    /// An empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            config: ChannelConfig::default(),
        }
    }

    /// Persist the store (no-op in memory).
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.config)
            .map_err(|e| KitsupassError::SerializationError(format!("bridge config: {e}")))?;
        write_atomic(path, json.as_bytes())
    }

    /// Our private key, generated and saved on first use.
    pub fn key_pair(&mut self) -> Result<SecretKey> {
        if let Some(jwk) = &self.config.browser_private_key {
            return jwk.to_secret_key::<NistP256>().map_err(|e| {
                KitsupassError::ConfigError(format!("stored browser key is invalid: {e}"))
            });
        }

        let secret = keys::generate();
        self.config.browser_private_key = Some(secret.to_jwk());
        self.config.browser_public_key = Some(secret.public_key().to_jwk());
        self.save()?;

        tracing::info!("generated bridge key pair");
        Ok(secret)
    }

    /// The registered public key for `peer_id`.
    pub fn peer(&self, peer_id: &str) -> Option<PublicKey> {
        self.config
            .browser_clients
            .get(peer_id)
            .and_then(|jwk| jwk.to_public_key::<NistP256>().ok())
    }

    /// Record (or replace) a peer and save.
    pub fn register_peer(&mut self, peer_id: &str, public: &PublicKey) -> Result<()> {
        self.config
            .browser_clients
            .insert(peer_id.to_string(), public.to_jwk());
        self.save()
    }

    /// Registered peer identifiers, sorted.
    pub fn peer_ids(&self) -> impl Iterator<Item = &str> {
        self.config.browser_clients.keys().map(String::as_str)
    }
}
