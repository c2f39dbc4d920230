//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod editor;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{KitsupassError, Result};
use crate::keyring::default_cache;
use crate::prompt::{password_from_env, TerminalPrompt};
use crate::vault::Vault;

/// Kitsupass CLI: a file-per-entry password store with a browser bridge.
#[derive(Parser)]
#[command(
    name = "kitsupass",
    about = "File-per-entry password store with an encrypted browser bridge",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store root directory (default: from config, else the user data dir)
    #[arg(long, env = "KITSUPASS_PATH", global = true)]
    pub vault: Option<PathBuf>,

    /// Config file (default: <config_dir>/kitsupass/config.toml)
    #[arg(long, env = "KITSUPASS_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new store
    Init,

    /// Print an entry, or list a folder (the whole store by default)
    #[command(visible_alias = "ls")]
    Show {
        /// Entry or folder name
        name: Option<String>,
    },

    /// List entries whose name contains a substring
    Find {
        /// Case-sensitive substring to look for
        needle: String,
    },

    /// Add a new entry
    Insert {
        /// Entry name (e.g. web/example.com)
        name: String,
        /// Read the entry text from stdin instead of an editor
        #[arg(long)]
        stdin: bool,
    },

    /// Replace the text of an existing entry
    Edit {
        /// Entry name
        name: String,
        /// Read the new text from stdin instead of an editor
        #[arg(long)]
        stdin: bool,
    },

    /// Delete an entry
    #[command(name = "rm")]
    Delete {
        /// Entry name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Move an entry or folder
    #[command(name = "mv")]
    Move {
        /// Current name
        name: String,
        /// New name
        new_name: String,
    },

    /// Copy an entry
    #[command(name = "cp")]
    Copy {
        /// Source name
        name: String,
        /// Destination name
        new_name: String,
    },

    /// Forget the cached master password
    Lock,

    /// Run the local browser bridge
    Serve {
        /// Listen address, overriding the config (e.g. 127.0.0.1:12821)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config` or the default location.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

/// The store root: `--vault` / `KITSUPASS_PATH`, else the configured path.
pub fn vault_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.vault {
        Some(path) => Ok(path.clone()),
        None => Ok(load_settings(cli)?.vault_path),
    }
}

/// A closed store handle wired to the OS keyring and the terminal prompt.
pub fn vault_handle(cli: &Cli) -> Result<Vault> {
    Ok(Vault::new(
        vault_path(cli)?,
        default_cache(),
        Box::new(TerminalPrompt),
    ))
}

/// A store handle that is already unlocked.
pub fn open_vault(cli: &Cli) -> Result<Vault> {
    let mut vault = vault_handle(cli)?;
    vault.open()?;
    Ok(vault)
}

/// Prompt for a new master password and its confirmation.
///
/// `KITSUPASS_PASSWORD` answers both prompts for scripted use.
pub fn prompt_new_password() -> Result<(Zeroizing<String>, Zeroizing<String>)> {
    if let Some(pw) = password_from_env() {
        return Ok((pw.clone(), pw));
    }

    if !console::user_attended_stderr() {
        return Err(KitsupassError::CommandFailed(
            "no terminal to prompt on; set KITSUPASS_PASSWORD".into(),
        ));
    }

    let password = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("Choose the primary vault password")
            .interact()
            .map_err(|e| KitsupassError::CommandFailed(format!("password prompt: {e}")))?,
    );
    let confirm = Zeroizing::new(
        dialoguer::Password::new()
            .with_prompt("Confirm the primary vault password")
            .interact()
            .map_err(|e| KitsupassError::CommandFailed(format!("password prompt: {e}")))?,
    );
    Ok((password, confirm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ls_is_an_alias_for_show() {
        let cli = Cli::try_parse_from(["kitsupass", "ls", "web"]).unwrap();
        match cli.command {
            Commands::Show { name } => assert_eq!(name.as_deref(), Some("web")),
            _ => panic!("expected show"),
        }
    }

    #[test]
    fn vault_flag_is_global() {
        let cli =
            Cli::try_parse_from(["kitsupass", "find", "mail", "--vault", "/tmp/store"]).unwrap();
        assert_eq!(cli.vault.as_deref(), Some(std::path::Path::new("/tmp/store")));
    }

    #[test]
    fn explicit_vault_wins_over_settings() {
        let cli = Cli::try_parse_from(["kitsupass", "--vault", "/tmp/store", "lock"]).unwrap();
        assert_eq!(vault_path(&cli).unwrap(), PathBuf::from("/tmp/store"));
    }
}
