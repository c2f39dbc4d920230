//! Vault module: the directory-backed password store.
//!
//! This module provides:
//! - The on-disk layout: marker file naming and atomic writes (`format`)
//! - Entry name validation and entry content parsing (`entry`)
//! - The high-level `Vault` engine (`store`)

pub mod entry;
pub mod format;
pub mod store;

// Re-export the most commonly used items.
pub use entry::EntryContent;
pub use store::{Entries, Unlocker, Vault, VerifiedPassword};
