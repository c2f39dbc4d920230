//! Status lines for the CLI.
//!
//! Everything here writes to stderr. Stdout is reserved for entry text and
//! listings so `kitsupass show name | head -1` yields just the password.

use console::{style, StyledObject};

fn status(mark: StyledObject<&str>, msg: &str) {
    eprintln!("{mark} {msg}");
}

pub fn success(msg: &str) {
    status(style("\u{2713}").green().bold(), msg);
}

/// The single line printed before a failing command exits.
pub fn error(msg: &str) {
    status(style("\u{2717}").red().bold(), msg);
}

pub fn warning(msg: &str) {
    status(style("!").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    status(style("\u{2022}").cyan(), msg);
}

/// A dimmed follow-up hint, e.g. the command to run next.
pub fn tip(msg: &str) {
    eprintln!("  {}", style(msg).dim());
}
