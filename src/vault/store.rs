//! High-level password store operations used by CLI commands and the
//! browser bridge.
//!
//! A `Vault` wraps a directory of individually encrypted entries. It is
//! `Closed` until `open` or `create` proves the master password against
//! the marker file, and holds that password in memory (zeroized on drop)
//! until `close`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use subtle::ConstantTimeEq;
use uuid::Uuid;
use walkdir::WalkDir;
use zeroize::Zeroizing;

use crate::crypto::{decrypt, encrypt};
use crate::errors::{KitsupassError, Result};
use crate::keyring::CredentialCache;
use crate::prompt::SecretPrompt;

use super::entry::{relative_name, resolve};
use super::format;

const PROMPT_TITLE: &str = "Enter the primary vault password";

/// The main store handle. Build one with `Vault::new`, then `create` or
/// `open` it before touching entries.
pub struct Vault {
    /// Store root directory.
    root: PathBuf,

    /// Identifier from the marker file, known once opened or created.
    id: Option<Uuid>,

    /// The master password while open.
    secret: Option<Zeroizing<String>>,

    cache: Arc<dyn CredentialCache>,
    prompt: Arc<dyn SecretPrompt>,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction and lifecycle
    // ------------------------------------------------------------------

    /// A closed handle on the store at `root`. Nothing is read yet.
    pub fn new(
        root: impl Into<PathBuf>,
        cache: Box<dyn CredentialCache>,
        prompt: Box<dyn SecretPrompt>,
    ) -> Self {
        Self {
            root: root.into(),
            id: None,
            secret: None,
            cache: Arc::from(cache),
            prompt: Arc::from(prompt),
        }
    }

    /// Create a brand-new store and leave it open.
    ///
    /// Fails with `PasswordMismatch` before touching the disk, and with
    /// `AlreadyExists` if the root directory is already there.
    pub fn create(&mut self, password: &str, confirm_password: &str) -> Result<()> {
        if password.as_bytes().ct_eq(confirm_password.as_bytes()).unwrap_u8() != 1 {
            return Err(KitsupassError::PasswordMismatch);
        }
        if self.root.exists() {
            return Err(KitsupassError::AlreadyExists(
                self.root.display().to_string(),
            ));
        }

        fs::create_dir_all(&self.root)?;
        set_private_dir(&self.root)?;

        let id = Uuid::new_v4();
        let marker = encrypt(&id.to_string(), password)?;
        format::write_atomic(&self.root.join(format::marker_name(&id)), marker.as_bytes())?;

        self.cache_secret(&id, password);
        self.id = Some(id);
        self.secret = Some(Zeroizing::new(password.to_string()));

        tracing::info!(root = %self.root.display(), %id, "store created");
        Ok(())
    }

    /// Unlock the store.
    ///
    /// Tries the credential cache first, then the prompt. A password is
    /// accepted only if it decrypts the marker back to the identifier.
    pub fn open(&mut self) -> Result<()> {
        let unlocker = self.unlocker()?;
        let verified = unlocker.obtain()?;
        self.unlock_with(verified)
    }

    /// Everything needed to find and check the password, detached from
    /// this handle so the search can run while the handle is shared.
    pub fn unlocker(&mut self) -> Result<Unlocker> {
        let id = self.identify()?;
        let marker = fs::read_to_string(self.root.join(format::marker_name(&id)))?;
        Ok(Unlocker {
            root: self.root.clone(),
            id,
            marker,
            cache: Arc::clone(&self.cache),
            prompt: Arc::clone(&self.prompt),
        })
    }

    /// Install a password that `Unlocker::obtain` has already checked.
    pub fn unlock_with(&mut self, verified: VerifiedPassword) -> Result<()> {
        let VerifiedPassword { id, password } = verified;
        if self.id != Some(id) {
            return Err(KitsupassError::WrongStorage(self.root.clone()));
        }
        self.secret = Some(password);
        tracing::info!(%id, "store opened");
        Ok(())
    }

    /// Forget the password: evict it from the cache and from memory.
    ///
    /// Works on a closed handle too, so a cached password can be evicted
    /// without unlocking first.
    pub fn close(&mut self) -> Result<()> {
        let id = match self.id {
            Some(id) => id,
            None => self.identify()?,
        };
        if let Err(e) = self.cache.remove(&id) {
            tracing::warn!(error = %e, "failed to evict cached password");
        }
        self.secret = None;
        tracing::info!(%id, "store closed");
        Ok(())
    }

    /// Scan the root for the marker and remember the identifier.
    ///
    /// Fails with `WrongStorage` if the root holds no marker.
    pub fn identify(&mut self) -> Result<Uuid> {
        if !self.root.is_dir() {
            return Err(KitsupassError::WrongStorage(self.root.clone()));
        }
        let (id, _) = format::find_marker(&self.root)?
            .ok_or_else(|| KitsupassError::WrongStorage(self.root.clone()))?;
        self.id = Some(id);
        Ok(id)
    }

    fn cache_secret(&self, id: &Uuid, password: &str) {
        cache_secret(self.cache.as_ref(), id, password);
    }

    fn secret(&self) -> Result<&str> {
        self.secret
            .as_deref()
            .map(String::as_str)
            .ok_or(KitsupassError::Locked)
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Store `data` under `name`, never overwriting.
    ///
    /// If `name` is taken the entry is stored as `name (2)`, `name (3)`,
    /// ... instead. Returns the name actually used.
    pub fn insert(&self, name: &str, data: &str) -> Result<String> {
        let secret = self.secret()?;
        let base = resolve(&self.root, name, false)?;

        let mut path = base.clone();
        let mut suffix = 2;
        while path.exists() {
            path = append_suffix(&base, suffix);
            suffix += 1;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let ciphertext = encrypt(data, secret)?;
        format::write_atomic(&path, ciphertext.as_bytes())?;

        let stored = relative_name(&self.root, &path).unwrap_or_else(|| name.to_string());
        tracing::debug!(name = %stored, "entry inserted");
        Ok(stored)
    }

    /// Replace the content of an existing entry.
    pub fn edit(&self, name: &str, data: &str) -> Result<()> {
        let secret = self.secret()?;
        let path = resolve(&self.root, name, false)?;
        if !path.is_file() {
            return Err(KitsupassError::NotFound(name.to_string()));
        }

        let ciphertext = encrypt(data, secret)?;
        format::write_atomic(&path, ciphertext.as_bytes())?;

        tracing::debug!(name, "entry updated");
        Ok(())
    }

    /// Decrypt an entry, or list the entries below a folder.
    ///
    /// The empty name lists the whole store. Listings are sorted and
    /// newline-joined, with names relative to the store root.
    pub fn show(&self, name: &str) -> Result<String> {
        let secret = self.secret()?;
        let path = resolve(&self.root, name, true)?;

        if path.is_dir() {
            let mut names: Vec<String> = Entries::below(&self.root, &path, "").iter().collect();
            names.sort();
            return Ok(names.join("\n"));
        }
        if !path.is_file() {
            return Err(KitsupassError::NotFound(name.to_string()));
        }

        let blob = fs::read_to_string(&path)?;
        decrypt(&blob, secret)
    }

    /// Remove an entry.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.secret()?;
        let path = resolve(&self.root, name, false)?;
        if !path.is_file() {
            return Err(KitsupassError::NotFound(name.to_string()));
        }

        fs::remove_file(&path)?;
        tracing::debug!(name, "entry deleted");
        Ok(())
    }

    /// Move an entry (or a whole folder) to `new_name`.
    pub fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        self.secret()?;
        let from = resolve(&self.root, name, false)?;
        let to = resolve(&self.root, new_name, false)?;
        if !from.exists() {
            return Err(KitsupassError::NotFound(name.to_string()));
        }
        if to.exists() {
            return Err(KitsupassError::AlreadyExists(new_name.to_string()));
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)?;

        tracing::debug!(from = name, to = new_name, "entry moved");
        Ok(())
    }

    /// Duplicate an entry's ciphertext under `new_name`.
    pub fn copy(&self, name: &str, new_name: &str) -> Result<()> {
        self.secret()?;
        let from = resolve(&self.root, name, false)?;
        let to = resolve(&self.root, new_name, false)?;
        if !from.is_file() {
            return Err(KitsupassError::NotFound(name.to_string()));
        }
        if to.exists() {
            return Err(KitsupassError::AlreadyExists(new_name.to_string()));
        }

        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        let ciphertext = fs::read(&from)?;
        format::write_atomic(&to, &ciphertext)?;

        tracing::debug!(from = name, to = new_name, "entry copied");
        Ok(())
    }

    /// Entry names containing `needle`. The empty needle matches all.
    ///
    /// Only names are read, so this works while the store is closed.
    pub fn find(&self, needle: &str) -> Result<Entries> {
        if !self.root.is_dir() {
            return Err(KitsupassError::WrongStorage(self.root.clone()));
        }
        Ok(Entries::below(&self.root, &self.root, needle))
    }

    /// Returns `true` if `name` is an existing entry.
    pub fn contains(&self, name: &str) -> bool {
        resolve(&self.root, name, false)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The store identifier, once `open`, `create` or `close` has read it.
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.secret.is_some()
    }
}

/// A pending unlock: the marker plus the password sources.
///
/// `obtain` may block on the prompt for as long as the user takes, so it
/// holds no reference to the `Vault` it came from.
pub struct Unlocker {
    root: PathBuf,
    id: Uuid,
    marker: String,
    cache: Arc<dyn CredentialCache>,
    prompt: Arc<dyn SecretPrompt>,
}

/// A master password proven against the marker of store `id`.
pub struct VerifiedPassword {
    id: Uuid,
    password: Zeroizing<String>,
}

impl Unlocker {
    /// Find a password that opens the marker: cache first, then prompt.
    /// A prompted password is written back to the cache.
    pub fn obtain(self) -> Result<VerifiedPassword> {
        let id = self.id;
        let cached = match self.cache.load(&id) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, "credential cache unavailable");
                None
            }
        };

        if let Some(password) = cached {
            if verify_marker(&self.marker, &id, &password) {
                return Ok(VerifiedPassword { id, password });
            }
            tracing::warn!(%id, "cached password no longer opens the store");
        }

        let subtitle = format!("Store {}", self.root.display());
        let password = self
            .prompt
            .prompt_secret(PROMPT_TITLE, &subtitle)?
            .ok_or(KitsupassError::InvalidPassword)?;

        if !verify_marker(&self.marker, &id, &password) {
            return Err(KitsupassError::InvalidPassword);
        }
        cache_secret(self.cache.as_ref(), &id, &password);
        Ok(VerifiedPassword { id, password })
    }
}

fn cache_secret(cache: &dyn CredentialCache, id: &Uuid, password: &str) {
    if let Err(e) = cache.save(id, password) {
        tracing::warn!(error = %e, "failed to cache password");
    }
}

/// Decrypt the marker and compare it with the identifier in its name.
fn verify_marker(marker: &str, id: &Uuid, password: &str) -> bool {
    match decrypt(marker, password) {
        Ok(plain) => {
            let expected = id.to_string();
            bool::from(plain.as_bytes().ct_eq(expected.as_bytes()))
        }
        Err(_) => false,
    }
}

/// `web/site` -> `web/site (2)`
fn append_suffix(path: &Path, n: usize) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(" ({n})"));
    path.with_file_name(name)
}

#[cfg(unix)]
fn set_private_dir(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_private_dir(_path: &Path) -> Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A restartable, lazily walked sequence of entry names.
///
/// Each call to `iter` walks the directory afresh, in filesystem order.
#[derive(Debug, Clone)]
pub struct Entries {
    root: PathBuf,
    base: PathBuf,
    needle: String,
}

impl Entries {
    fn below(root: &Path, base: &Path, needle: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            base: base.to_path_buf(),
            needle: needle.to_string(),
        }
    }

    pub fn iter(&self) -> EntriesIter {
        EntriesIter {
            root: self.root.clone(),
            needle: self.needle.clone(),
            walk: WalkDir::new(&self.base).min_depth(1).into_iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Entries {
    type Item = String;
    type IntoIter = EntriesIter;

    fn into_iter(self) -> EntriesIter {
        self.iter()
    }
}

/// One pass over an [`Entries`] walk.
pub struct EntriesIter {
    root: PathBuf,
    needle: String,
    walk: walkdir::IntoIter,
}

impl Iterator for EntriesIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let dirent = match self.walk.next()? {
                Ok(dirent) => dirent,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable path");
                    continue;
                }
            };
            if !dirent.file_type().is_file() {
                continue;
            }
            match dirent.file_name().to_str() {
                Some(file_name) if !format::is_reserved(file_name) => {}
                _ => continue,
            }
            let Some(name) = relative_name(&self.root, dirent.path()) else {
                continue;
            };
            if name.contains(self.needle.as_str()) {
                return Some(name);
            }
        }
    }
}
