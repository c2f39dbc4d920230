//! Entry text input for `insert` and `edit`.
//!
//! Text comes from stdin, or from `$VISUAL` / `$EDITOR` / `vi` run on a
//! private temp file that is overwritten with zeros and removed as soon
//! as the editor exits.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use uuid::Uuid;
use zeroize::Zeroizing;

use crate::errors::{KitsupassError, Result};

/// Read the entry text, from stdin or an editor seeded with `initial`.
pub fn compose(initial: &str, from_stdin: bool) -> Result<Zeroizing<String>> {
    let text = if from_stdin {
        read_stdin()?
    } else {
        edit_text(initial)?
    };
    Ok(Zeroizing::new(trim_final_newline(&text).to_string()))
}

/// Everything on stdin.
pub fn read_stdin() -> Result<Zeroizing<String>> {
    let mut text = Zeroizing::new(String::new());
    std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

/// Run the editor on a temp file holding `initial`, return what was saved.
pub fn edit_text(initial: &str) -> Result<Zeroizing<String>> {
    let tmp_path = write_temp_file(initial)?;
    let outcome = run_editor(&tmp_path).and_then(|()| {
        fs::read_to_string(&tmp_path)
            .map(Zeroizing::new)
            .map_err(|e| KitsupassError::EditorError(format!("failed to read edited file: {e}")))
    });
    secure_delete(&tmp_path);
    outcome
}

fn run_editor(path: &Path) -> Result<()> {
    let editor = find_editor();
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| KitsupassError::EditorError(format!("failed to launch '{editor}': {e}")))?;

    if !status.success() {
        return Err(KitsupassError::EditorError(format!(
            "editor exited with code {}",
            status.code().unwrap_or(-1)
        )));
    }
    Ok(())
}

fn write_temp_file(initial: &str) -> Result<PathBuf> {
    let tmp_path = std::env::temp_dir().join(format!("kitsupass-{}.txt", Uuid::new_v4()));

    // Created with restrictive permissions up front, never widened.
    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&tmp_path)
            .map_err(|e| KitsupassError::EditorError(format!("failed to create temp file: {e}")))?
    };

    #[cfg(not(unix))]
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|e| KitsupassError::EditorError(format!("failed to create temp file: {e}")))?;

    if let Err(e) = file.write_all(initial.as_bytes()).and_then(|()| file.flush()) {
        secure_delete(&tmp_path);
        return Err(e.into());
    }
    Ok(tmp_path)
}

/// The user's preferred editor.
fn find_editor() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|editor| !editor.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Editors append a newline on save; one is dropped.
fn trim_final_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// Overwrite a file with zeros, then delete it. Best-effort.
fn secure_delete(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let len = metadata.len() as usize;
        if len > 0 {
            if let Ok(mut file) = fs::OpenOptions::new().write(true).open(path) {
                let _ = file.write_all(&vec![0u8; len]);
                let _ = file.sync_all();
            }
        }
    }
    let _ = fs::remove_file(path);
}
