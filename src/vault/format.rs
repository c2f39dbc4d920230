//! On-disk layout of a password store.
//!
//! A store is a plain directory:
//!
//! ```text
//! <root>/
//!   .urn:uuid:<id>        marker: OpenSSL-format ciphertext of "<id>"
//!   email/work            entry: OpenSSL-format ciphertext of its text
//!   web/example.com (2)
//! ```
//!
//! The marker is the only proof of password correctness: decrypting it
//! with the right password reproduces the identifier in its name.
//! Every other file below the root, at any depth, is an entry.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::Result;

/// Prefix of the marker file name; the identifier follows it.
pub const MARKER_PREFIX: &str = ".urn:uuid:";

/// Build the marker file name for a store identifier.
pub fn marker_name(id: &Uuid) -> String {
    format!("{MARKER_PREFIX}{id}")
}

/// Parse a directory entry name as a marker, returning its identifier.
pub fn parse_marker(file_name: &str) -> Option<Uuid> {
    file_name
        .strip_prefix(MARKER_PREFIX)
        .and_then(|id| Uuid::parse_str(id).ok())
}

/// Scan the direct children of `root` for the marker file.
///
/// Returns `Ok(None)` when the root exists but holds no marker.
pub fn find_marker(root: &Path) -> Result<Option<(Uuid, PathBuf)>> {
    for dirent in fs::read_dir(root)? {
        let dirent = dirent?;
        if !dirent.file_type()?.is_file() {
            continue;
        }
        if let Some(id) = dirent.file_name().to_str().and_then(parse_marker) {
            return Ok(Some((id, dirent.path())));
        }
    }
    Ok(None)
}

/// Returns `true` for names this layout reserves: the marker and the
/// hidden temp files used while writing.
pub fn is_reserved(file_name: &str) -> bool {
    parse_marker(file_name).is_some() || is_temp_file(file_name)
}

fn is_temp_file(file_name: &str) -> bool {
    file_name.starts_with('.') && file_name.ends_with(".tmp")
}

/// Path of the hidden sibling used to stage a write to `path`.
fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Write `contents` to `path` **atomically**.
///
/// The bytes go to a temp file in the same directory, are flushed to
/// disk, and the temp file is renamed over the target. Readers see
/// either the old file or the new one, never a truncated mix. On Unix
/// the file is created with mode 0600.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path);

    let result = (|| {
        let mut file = create_private(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    Ok(result?)
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
