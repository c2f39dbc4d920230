//! P-256 key pairs and ECDH shared secrets for the browser bridge.

use aes_gcm::aead::OsRng;
use p256::ecdh::diffie_hellman;
use p256::{PublicKey, SecretKey};
use zeroize::Zeroizing;

use crate::errors::{KitsupassError, Result};

/// Generate a fresh P-256 private key.
pub fn generate() -> SecretKey {
    SecretKey::random(&mut OsRng)
}

/// ECDH between our private key and the other side's public key.
///
/// Returns the 32-byte x-coordinate as lower-case hex, which is the
/// input to the envelope key derivation. Both sides of a pairing
/// compute the same string.
pub fn shared_secret(secret: &SecretKey, public: &PublicKey) -> Zeroizing<String> {
    let shared = diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
    Zeroizing::new(hex::encode(shared.raw_secret_bytes()))
}

/// Parse a public key from its JWK JSON form.
pub fn public_key_from_jwk(jwk: &str) -> Result<PublicKey> {
    PublicKey::from_jwk_str(jwk)
        .map_err(|_| KitsupassError::BadRequest("publicKey is not a P-256 JWK".into()))
}

/// Serialize a public key as a JWK JSON string.
pub fn public_key_to_jwk(public: &PublicKey) -> String {
    public.to_jwk_string()
}
