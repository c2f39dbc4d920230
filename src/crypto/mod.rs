//! Cryptographic building blocks for Kitsupass.
//!
//! This module provides:
//! - OpenSSL-compatible AES-256-CBC entry encryption (`openssl`)
//! - PBKDF2-HMAC-SHA256 key derivation and randomness helpers (`kdf`)
//! - The AES-256-GCM bridge envelope (`envelope`)

pub mod envelope;
pub mod kdf;
pub mod openssl;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt};
pub use openssl::{decrypt, encrypt, encrypt_with_salt};
