use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Kitsupass.
#[derive(Debug, Error)]
pub enum KitsupassError {
    // --- Storage errors ---
    #[error("No password store found at {0}")]
    WrongStorage(PathBuf),

    #[error("Invalid password")]
    InvalidPassword,

    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password store is locked")]
    Locked,

    #[error("'{0}' does not exist")]
    NotFound(String),

    #[error("Invalid entry name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    // --- Crypto errors ---
    /// The detail is kept for logs; users see the same message as
    /// `Authentication`.
    #[error("Invalid password or corrupted entry")]
    Format(String),

    #[error("Invalid password or corrupted entry")]
    Authentication,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Channel errors ---
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Editor error: {0}")]
    EditorError(String),
}

/// Convenience type alias for Kitsupass results.
pub type Result<T> = std::result::Result<T, KitsupassError>;
