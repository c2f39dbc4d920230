//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! Two parameter sets are used:
//! - the OpenSSL `enc -pbkdf2 -iter 10000` set, which derives a 32-byte
//!   AES key and a 16-byte IV in one 48-byte stretch;
//! - the bridge envelope set, which derives a single 32-byte key with a
//!   caller-declared round count (100 000 when sealing).

use pbkdf2::pbkdf2_hmac;
use rand::{Rng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Iterations used by `openssl enc -pbkdf2 -iter 10000`.
pub const OPENSSL_ITERATIONS: u32 = 10_000;

/// Length of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the AES block / CBC IV in bytes.
pub const IV_LEN: usize = 16;

/// A derived AES-256 key and CBC IV, wiped on drop.
pub struct KeyIv {
    material: Zeroizing<[u8; KEY_LEN + IV_LEN]>,
}

impl KeyIv {
    pub fn key(&self) -> &[u8] {
        &self.material[..KEY_LEN]
    }

    pub fn iv(&self) -> &[u8] {
        &self.material[KEY_LEN..]
    }
}

/// Derive the OpenSSL key/IV pair from a password and an 8-byte salt.
///
/// The same password + salt always produce the same pair, which is what
/// makes the output byte-compatible with the `openssl` tool.
pub fn derive_key_iv(password: &[u8], salt: &[u8]) -> KeyIv {
    let mut material = Zeroizing::new([0u8; KEY_LEN + IV_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, OPENSSL_ITERATIONS, &mut material[..]);
    KeyIv { material }
}

/// Derive a 32-byte envelope key from a shared secret, salt and round count.
pub fn derive_key(secret: &[u8], salt: &[u8], rounds: u32) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(secret, salt, rounds, &mut key[..]);
    key
}

/// Fill a fixed-size array with cryptographically random bytes.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Draw `len` characters uniformly from `alphabet`.
pub fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(alphabet[rng.random_range(0..alphabet.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_iv_is_deterministic() {
        let a = derive_key_iv(b"password", b"saltsalt");
        let b = derive_key_iv(b"password", b"saltsalt");
        assert_eq!(a.key(), b.key());
        assert_eq!(a.iv(), b.iv());
        assert_eq!(a.key().len(), KEY_LEN);
        assert_eq!(a.iv().len(), IV_LEN);
    }

    #[test]
    fn derive_key_iv_differs_per_salt() {
        let a = derive_key_iv(b"password", b"saltsalt");
        let b = derive_key_iv(b"password", b"tlastlas");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn derive_key_depends_on_rounds() {
        let a = derive_key(b"secret", b"salt", 1_000);
        let b = derive_key(b"secret", b"salt", 1_001);
        assert_ne!(*a, *b);
    }

    #[test]
    fn random_string_uses_alphabet() {
        let s = random_string(b"AB", 64);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c == 'A' || c == 'B'));
    }
}
