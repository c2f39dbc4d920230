//! Interactive master-password prompts.
//!
//! The vault engine asks a `SecretPrompt` for the password when the
//! credential cache has none. Returning `Ok(None)` means "no password
//! available", which the vault reports as an invalid password.

use zeroize::Zeroizing;

use crate::errors::{KitsupassError, Result};

/// Environment variable that supplies the master password without a prompt.
pub const PASSWORD_ENV: &str = "KITSUPASS_PASSWORD";

/// Source of a master password.
pub trait SecretPrompt: Send + Sync {
    fn prompt_secret(&self, title: &str, subtitle: &str) -> Result<Option<Zeroizing<String>>>;
}

/// Reads `KITSUPASS_PASSWORD`, then asks on the terminal.
///
/// When neither is available (no variable, no attended terminal) the
/// prompt yields `None` instead of blocking.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn prompt_secret(&self, title: &str, subtitle: &str) -> Result<Option<Zeroizing<String>>> {
        if let Some(pw) = password_from_env() {
            return Ok(Some(pw));
        }

        if !console::user_attended_stderr() {
            tracing::debug!("no terminal attached, skipping password prompt");
            return Ok(None);
        }

        if !subtitle.is_empty() {
            eprintln!("{}", console::style(subtitle).dim());
        }
        let pw = dialoguer::Password::new()
            .with_prompt(title)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| KitsupassError::CommandFailed(format!("password prompt: {e}")))?;

        if pw.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Zeroizing::new(pw)))
        }
    }
}

/// Always answers with the same password.
#[derive(Clone)]
pub struct StaticPrompt(Zeroizing<String>);

impl StaticPrompt {
    pub fn new(password: &str) -> Self {
        Self(Zeroizing::new(password.to_string()))
    }
}

impl SecretPrompt for StaticPrompt {
    fn prompt_secret(&self, _title: &str, _subtitle: &str) -> Result<Option<Zeroizing<String>>> {
        Ok(Some(self.0.clone()))
    }
}

/// Never has a password. Used where prompting is impossible.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl SecretPrompt for NoPrompt {
    fn prompt_secret(&self, _title: &str, _subtitle: &str) -> Result<Option<Zeroizing<String>>> {
        Ok(None)
    }
}

/// The `KITSUPASS_PASSWORD` value, if set and non-empty.
pub fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_prompt_answers() {
        let prompt = StaticPrompt::new("hunter2");
        let pw = prompt.prompt_secret("title", "").unwrap().unwrap();
        assert_eq!(pw.as_str(), "hunter2");
    }

    #[test]
    fn no_prompt_has_nothing() {
        assert!(NoPrompt.prompt_secret("title", "").unwrap().is_none());
    }
}
