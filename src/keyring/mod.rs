//! Master-password caching in the OS credential store.
//!
//! A vault's password is cached under its UUID so repeated commands do
//! not prompt every time. The backing store is:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! The OS store is only compiled in with the `keyring-store` feature.
//! Without it (or when the store is unreachable) caching degrades to a
//! no-op and the vault falls back to prompting.

use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::errors::Result;

/// Service name used in the OS keyring.
#[cfg(feature = "keyring-store")]
const SERVICE_NAME: &str = "kitsupass";

/// Where a vault's master password may be remembered between runs.
pub trait CredentialCache: Send + Sync {
    /// Return the cached password for `id`, if any.
    fn load(&self, id: &Uuid) -> Result<Option<Zeroizing<String>>>;

    /// Remember `secret` as the password for `id`.
    fn save(&self, id: &Uuid, secret: &str) -> Result<()>;

    /// Forget the password for `id`. Forgetting nothing is not an error.
    fn remove(&self, id: &Uuid) -> Result<()>;
}

/// Build the keyring entry name for a vault.
pub fn entry_key(id: &Uuid) -> String {
    format!("kitsupass://{id}")
}

/// The default cache for this build: the OS keyring when compiled in,
/// otherwise nothing.
pub fn default_cache() -> Box<dyn CredentialCache> {
    #[cfg(feature = "keyring-store")]
    {
        Box::new(KeyringCache)
    }

    #[cfg(not(feature = "keyring-store"))]
    {
        Box::new(NoCache)
    }
}

/// A cache that never remembers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl CredentialCache for NoCache {
    fn load(&self, _id: &Uuid) -> Result<Option<Zeroizing<String>>> {
        Ok(None)
    }

    fn save(&self, _id: &Uuid, _secret: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _id: &Uuid) -> Result<()> {
        Ok(())
    }
}

/// Process-local cache, used by tests and by long-running callers that
/// want caching without touching the OS store.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Uuid, Zeroizing<String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a password is cached for `id`.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.entries.lock().contains_key(id)
    }
}

impl CredentialCache for MemoryCache {
    fn load(&self, id: &Uuid) -> Result<Option<Zeroizing<String>>> {
        Ok(self.entries.lock().get(id).cloned())
    }

    fn save(&self, id: &Uuid, secret: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(*id, Zeroizing::new(secret.to_string()));
        Ok(())
    }

    fn remove(&self, id: &Uuid) -> Result<()> {
        self.entries.lock().remove(id);
        Ok(())
    }
}

impl<C: CredentialCache + ?Sized> CredentialCache for std::sync::Arc<C> {
    fn load(&self, id: &Uuid) -> Result<Option<Zeroizing<String>>> {
        (**self).load(id)
    }

    fn save(&self, id: &Uuid, secret: &str) -> Result<()> {
        (**self).save(id, secret)
    }

    fn remove(&self, id: &Uuid) -> Result<()> {
        (**self).remove(id)
    }
}

/// The OS credential store.
#[cfg(feature = "keyring-store")]
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringCache;

#[cfg(feature = "keyring-store")]
impl KeyringCache {
    fn entry(id: &Uuid) -> Result<keyring::Entry> {
        keyring::Entry::new(SERVICE_NAME, &entry_key(id)).map_err(|e| {
            crate::errors::KitsupassError::KeyringError(format!(
                "failed to create keyring entry: {e}"
            ))
        })
    }
}

#[cfg(feature = "keyring-store")]
impl CredentialCache for KeyringCache {
    fn load(&self, id: &Uuid) -> Result<Option<Zeroizing<String>>> {
        match Self::entry(id)?.get_password() {
            Ok(password) => Ok(Some(Zeroizing::new(password))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(crate::errors::KitsupassError::KeyringError(format!(
                "failed to read from keyring: {e}"
            ))),
        }
    }

    fn save(&self, id: &Uuid, secret: &str) -> Result<()> {
        Self::entry(id)?.set_password(secret).map_err(|e| {
            crate::errors::KitsupassError::KeyringError(format!(
                "failed to store password in keyring: {e}"
            ))
        })
    }

    fn remove(&self, id: &Uuid) -> Result<()> {
        match Self::entry(id)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(crate::errors::KitsupassError::KeyringError(format!(
                "failed to delete from keyring: {e}"
            ))),
        }
    }
}
