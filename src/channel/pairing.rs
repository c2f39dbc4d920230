//! Single-use pairing codes.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::crypto::kdf::random_string;
use crate::errors::{KitsupassError, Result};

/// Number of characters in a pairing code.
pub const CODE_LEN: usize = 12;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Holds at most one live pairing code.
#[derive(Default)]
pub struct Pairing {
    code: Option<Zeroizing<String>>,
}

impl Pairing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new code, replacing any live one.
    pub fn issue(&mut self) -> Zeroizing<String> {
        let code = Zeroizing::new(random_string(CODE_ALPHABET, CODE_LEN));
        self.code = Some(code.clone());
        code
    }

    /// Spend the live code if `presented` matches it.
    ///
    /// A wrong code, or no live code, fails with `Forbidden` and leaves
    /// the live code untouched.
    pub fn consume(&mut self, presented: &str) -> Result<()> {
        let matches = self
            .code
            .as_ref()
            .is_some_and(|code| bool::from(code.as_bytes().ct_eq(presented.as_bytes())));
        if !matches {
            return Err(KitsupassError::Forbidden);
        }
        self.code = None;
        Ok(())
    }

    pub fn is_live(&self) -> bool {
        self.code.is_some()
    }
}
