//! AES-256-GCM envelope used on the browser bridge.
//!
//! Each message is sealed under a key stretched from the peer's shared
//! secret and serialized as six `$`-separated ASCII fields:
//!
//! ```text
//! base64(ciphertext) $ hex(iv: 16 bytes) $ salt: 12 letters $ hex(tag) $ rounds $ "gcm"
//! ```
//!
//! The IV and salt strings (concatenated, as written) are bound into the
//! tag as additional authenticated data.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{AesGcm, Nonce, Tag};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::kdf::{derive_key, random_bytes, random_string};
use crate::errors::{KitsupassError, Result};

/// AES-256-GCM with the 16-byte IV the bridge protocol uses.
type Aes256Gcm16 = AesGcm<aes::Aes256, U16>;

/// PBKDF2 rounds written into every sealed envelope.
pub const ROUNDS: u32 = 100_000;

/// Highest round count `open` will derive with. Anything larger is
/// treated as a forged envelope rather than stretched.
pub const MAX_ROUNDS: u32 = ROUNDS;

/// The only cipher method this envelope speaks.
pub const METHOD: &str = "gcm";

/// Length of the random IV in bytes.
const IV_LEN: usize = 16;

/// Length of the GCM tag in bytes.
const TAG_LEN: usize = 16;

/// Number of characters in the salt.
const SALT_LEN: usize = 12;

const SALT_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Field separator.
const SEPARATOR: char = '$';

/// Seal `plaintext` for the peer whose hex-encoded shared secret is `secret`.
pub fn seal(secret: &str, plaintext: &[u8]) -> Result<String> {
    let iv = hex::encode(random_bytes::<IV_LEN>());
    let salt = random_string(SALT_ALPHABET, SALT_LEN);

    let key = derive_key(secret.as_bytes(), salt.as_bytes(), ROUNDS);
    let cipher = Aes256Gcm16::new_from_slice(&key[..])
        .map_err(|e| KitsupassError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let iv_bytes = hex::decode(&iv)
        .map_err(|e| KitsupassError::EncryptionFailed(format!("iv encoding: {e}")))?;
    let aad = format!("{iv}{salt}");

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(&iv_bytes), aad.as_bytes(), &mut buffer)
        .map_err(|e| KitsupassError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok([
        BASE64.encode(&buffer),
        iv,
        salt,
        hex::encode(tag),
        ROUNDS.to_string(),
        METHOD.to_string(),
    ]
    .join(&SEPARATOR.to_string()))
}

/// Open an envelope sealed with the same shared secret.
///
/// Fails with `Format` when the field count is wrong. Any other defect
/// (bad hex or base64, unknown method, round count outside
/// `1..=MAX_ROUNDS`, altered field) is `Authentication`.
pub fn open(secret: &str, envelope: &str) -> Result<Vec<u8>> {
    let fields: Vec<&str> = envelope.trim().split(SEPARATOR).collect();
    let [content, iv, salt, tag, rounds, method] = fields.as_slice() else {
        return Err(KitsupassError::Format(format!(
            "expected 6 envelope fields, got {}",
            fields.len()
        )));
    };

    if *method != METHOD {
        return Err(KitsupassError::Authentication);
    }
    let rounds: u32 = rounds
        .parse()
        .ok()
        .filter(|r| (1..=MAX_ROUNDS).contains(r))
        .ok_or(KitsupassError::Authentication)?;

    let iv_bytes = hex::decode(iv).map_err(|_| KitsupassError::Authentication)?;
    let tag_bytes = hex::decode(tag).map_err(|_| KitsupassError::Authentication)?;
    if iv_bytes.len() != IV_LEN || tag_bytes.len() != TAG_LEN {
        return Err(KitsupassError::Authentication);
    }
    let mut buffer = BASE64
        .decode(content)
        .map_err(|_| KitsupassError::Authentication)?;

    let key = derive_key(secret.as_bytes(), salt.as_bytes(), rounds);
    let cipher =
        Aes256Gcm16::new_from_slice(&key[..]).map_err(|_| KitsupassError::Authentication)?;

    let aad = format!("{iv}{salt}");
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(&iv_bytes),
            aad.as_bytes(),
            &mut buffer,
            Tag::<U16>::from_slice(&tag_bytes),
        )
        .map_err(|_| KitsupassError::Authentication)?;

    Ok(buffer)
}
