//! OpenSSL-compatible password encryption for vault entries.
//!
//! Every entry file holds exactly what
//! `openssl aes-256-cbc -e -pbkdf2 -md sha256 -iter 10000 -a` would print:
//!
//! ```text
//! base64( "Salted__" | salt: 8 bytes | AES-256-CBC ciphertext, PKCS#7 padded )
//! ```
//!
//! wrapped at 64 characters with a newline after every line, so either
//! side can decrypt what the other wrote.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::{Zeroize, Zeroizing};

use super::kdf::{derive_key_iv, random_bytes};
use crate::errors::{KitsupassError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Header OpenSSL writes before the salt.
const MAGIC: &[u8; 8] = b"Salted__";

/// Length of the random salt in bytes.
pub const SALT_LEN: usize = 8;

/// Base64 line width used by `openssl -a`.
const LINE_WIDTH: usize = 64;

/// Encrypt `plaintext` under `password` with a fresh random salt.
pub fn encrypt(plaintext: &str, password: &str) -> Result<String> {
    encrypt_with_salt(plaintext, password, &random_bytes::<SALT_LEN>())
}

/// Encrypt with an explicit salt.
///
/// Exposed so the output can be compared byte-for-byte with the
/// `openssl` tool run against the same salt.
pub fn encrypt_with_salt(plaintext: &str, password: &str, salt: &[u8; SALT_LEN]) -> Result<String> {
    let key_iv = derive_key_iv(password.as_bytes(), salt);
    let cipher = Aes256CbcEnc::new_from_slices(key_iv.key(), key_iv.iv())
        .map_err(|e| KitsupassError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut raw = Vec::with_capacity(MAGIC.len() + SALT_LEN + ciphertext.len());
    raw.extend_from_slice(MAGIC);
    raw.extend_from_slice(salt);
    raw.extend_from_slice(&ciphertext);

    Ok(wrap_lines(&BASE64.encode(raw)))
}

/// Decrypt a blob produced by `encrypt` or by the `openssl` tool.
///
/// A wrong password and a corrupted blob are indistinguishable here:
/// undecodable base64, bad padding and invalid UTF-8 all end up as
/// `Authentication`. Only a missing `Salted__` header is `Format`.
pub fn decrypt(blob: &str, password: &str) -> Result<String> {
    let compact: String = blob.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let raw = BASE64
        .decode(compact)
        .map_err(|_| KitsupassError::Authentication)?;

    if raw.len() < MAGIC.len() + SALT_LEN || &raw[..MAGIC.len()] != MAGIC {
        return Err(KitsupassError::Format("missing Salted__ header".into()));
    }

    let (salt, ciphertext) = raw[MAGIC.len()..].split_at(SALT_LEN);
    let key_iv = derive_key_iv(password.as_bytes(), salt);
    let cipher = Aes256CbcDec::new_from_slices(key_iv.key(), key_iv.iv())
        .map_err(|_| KitsupassError::Authentication)?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| KitsupassError::Authentication)?,
    );

    String::from_utf8(plaintext.to_vec()).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        KitsupassError::Authentication
    })
}

/// Break a base64 string into 64-character lines, each ending in `\n`.
fn wrap_lines(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH + 1);
    for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is pure ASCII, so chunk boundaries are char boundaries.
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_lines_splits_at_64() {
        let s = "A".repeat(130);
        let wrapped = wrap_lines(&s);
        let lines: Vec<&str> = wrapped.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 64);
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines[2].len(), 2);
        assert!(wrapped.ends_with('\n'));
    }

    #[test]
    fn wrap_lines_empty_input() {
        assert_eq!(wrap_lines(""), "");
    }

    #[test]
    fn encrypt_starts_with_salted_header() {
        let blob = encrypt("plaintext", "password").unwrap();
        // base64("Salted__") == "U2FsdGVkX1"
        assert!(blob.starts_with("U2FsdGVkX1"));
    }

    #[test]
    fn decrypt_rejects_missing_header() {
        let blob = BASE64.encode(b"NotSalted0123456789abcdef");
        assert!(matches!(
            decrypt(&blob, "password"),
            Err(KitsupassError::Format(_))
        ));
    }

    #[test]
    fn decrypt_treats_bad_base64_as_authentication() {
        assert!(matches!(
            decrypt("%%% not base64 %%%", "password"),
            Err(KitsupassError::Authentication)
        ));
    }

    #[test]
    fn decrypt_rejects_truncated_ciphertext() {
        let mut raw = MAGIC.to_vec();
        raw.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        raw.extend_from_slice(&[0u8; 5]);
        let blob = BASE64.encode(raw);
        assert!(matches!(
            decrypt(&blob, "password"),
            Err(KitsupassError::Authentication)
        ));
    }
}
