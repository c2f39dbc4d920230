//! Secure channel between the store and paired browsers.
//!
//! This module provides:
//! - P-256 key pairs and ECDH shared secrets (`keys`)
//! - The persistent key and peer registry (`store`)
//! - Single-use pairing codes (`pairing`)
//! - `SecureChannel`, which ties them to the envelope in `crypto::envelope`
//!
//! Pairing and the peer registry sit behind one lock so a code can only
//! ever be spent once, even under concurrent requests. Key agreement and
//! envelope work happen outside the lock.

pub mod keys;
pub mod pairing;
pub mod store;

use p256::{PublicKey, SecretKey};
use parking_lot::RwLock;
use regex::Regex;
use zeroize::Zeroizing;

use crate::crypto::envelope;
use crate::errors::{KitsupassError, Result};

pub use pairing::Pairing;
pub use store::ChannelStore;

/// Peer identifiers are ULIDs.
const PEER_ID_PATTERN: &str = r"^[A-Z0-9]{26}$";

struct ChannelState {
    store: ChannelStore,
    pairing: Pairing,
}

/// The store side of the browser channel.
pub struct SecureChannel {
    state: RwLock<ChannelState>,
    secret_key: SecretKey,
    public_key: PublicKey,
    peer_id_pattern: Regex,
}

impl SecureChannel {
    /// Wrap `store`, generating our key pair on first use.
    pub fn new(mut store: ChannelStore) -> Result<Self> {
        let secret_key = store.key_pair()?;
        let public_key = secret_key.public_key();
        let peer_id_pattern = Regex::new(PEER_ID_PATTERN)
            .map_err(|e| KitsupassError::ConfigError(format!("peer id pattern: {e}")))?;
        tracing::debug!(peers = store.peer_ids().count(), "channel ready");

        Ok(Self {
            state: RwLock::new(ChannelState {
                store,
                pairing: Pairing::new(),
            }),
            secret_key,
            public_key,
            peer_id_pattern,
        })
    }

    /// Our public key as a JWK JSON string.
    pub fn public_key_jwk(&self) -> String {
        keys::public_key_to_jwk(&self.public_key)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Start pairing: issue a fresh code to show to the local user.
    pub fn request_pairing(&self) -> Zeroizing<String> {
        let code = self.state.write().pairing.issue();
        tracing::info!("pairing code issued");
        code
    }

    /// Finish pairing: if `code` is the live code, register `peer_id`
    /// with its JWK public key and spend the code.
    ///
    /// A malformed identifier or key is `BadRequest`; a wrong or stale
    /// code is `Forbidden`. Neither changes any state.
    pub fn complete_pairing(&self, code: &str, peer_id: &str, public_key_jwk: &str) -> Result<()> {
        if !self.peer_id_pattern.is_match(peer_id) {
            return Err(KitsupassError::BadRequest(
                "id must be 26 characters of A-Z and 0-9".into(),
            ));
        }
        let public = keys::public_key_from_jwk(public_key_jwk)?;

        let mut state = self.state.write();
        if let Err(e) = state.pairing.consume(code) {
            tracing::warn!("pairing rejected: wrong or stale code");
            return Err(e);
        }
        state.store.register_peer(peer_id, &public)?;

        tracing::info!(peer = peer_id, "peer paired");
        Ok(())
    }

    pub fn is_registered(&self, peer_id: &str) -> bool {
        self.state.read().store.peer(peer_id).is_some()
    }

    /// Hex ECDH secret shared with `peer_id`.
    pub fn shared_secret(&self, peer_id: &str) -> Result<Zeroizing<String>> {
        let public = self
            .state
            .read()
            .store
            .peer(peer_id)
            .ok_or(KitsupassError::Unauthorized("No key registered"))?;
        Ok(keys::shared_secret(&self.secret_key, &public))
    }

    /// Seal `plaintext` for `peer_id`.
    pub fn encrypt_payload(&self, peer_id: &str, plaintext: &[u8]) -> Result<String> {
        let secret = self.shared_secret(peer_id)?;
        envelope::seal(&secret, plaintext)
    }

    /// Open an envelope sealed by `peer_id`.
    pub fn decrypt_payload(&self, peer_id: &str, sealed: &str) -> Result<Vec<u8>> {
        let secret = self.shared_secret(peer_id)?;
        envelope::open(&secret, sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: &str = "01J0ABCDEFGHJKMNPQRSTVWXYZ";

    fn paired() -> (SecureChannel, SecretKey) {
        let channel = SecureChannel::new(ChannelStore::in_memory()).unwrap();
        let peer_key = keys::generate();
        let code = channel.request_pairing();
        channel
            .complete_pairing(&code, PEER, &keys::public_key_to_jwk(&peer_key.public_key()))
            .unwrap();
        (channel, peer_key)
    }

    #[test]
    fn pairing_registers_peer() {
        let (channel, _) = paired();
        assert!(channel.is_registered(PEER));
        assert!(!channel.is_registered("01J0ABCDEFGHJKMNPQRSTVWXY0"));
    }

    #[test]
    fn both_sides_derive_the_same_secret() {
        let (channel, peer_key) = paired();
        let ours = channel.shared_secret(PEER).unwrap();
        let theirs = keys::shared_secret(&peer_key, channel.public_key());
        assert_eq!(*ours, *theirs);
    }

    #[test]
    fn rejects_malformed_peer_id() {
        let channel = SecureChannel::new(ChannelStore::in_memory()).unwrap();
        let code = channel.request_pairing();
        let jwk = keys::public_key_to_jwk(&keys::generate().public_key());

        let err = channel.complete_pairing(&code, "not-a-ulid", &jwk).unwrap_err();
        assert!(matches!(err, KitsupassError::BadRequest(_)));
        // The code survives a rejected request.
        channel.complete_pairing(&code, PEER, &jwk).unwrap();
    }

    #[test]
    fn unknown_peer_is_unauthorized() {
        let channel = SecureChannel::new(ChannelStore::in_memory()).unwrap();
        assert!(matches!(
            channel.encrypt_payload(PEER, b"x"),
            Err(KitsupassError::Unauthorized(_))
        ));
    }
}
