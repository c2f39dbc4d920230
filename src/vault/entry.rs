//! Entry names and entry content.
//!
//! Entry names are `/`-separated paths relative to the store root
//! (`web/example.com`). They are validated before any filesystem
//! access so a name can never escape the root or touch the marker.

use std::path::{Path, PathBuf};

use crate::errors::{KitsupassError, Result};

use super::format;

/// Maximum length of an entry name in bytes.
const MAX_NAME_LEN: usize = 1024;

/// Validate `name` and resolve it to a path under `root`.
///
/// The empty name addresses the root itself and is only accepted when
/// `allow_root` is set (folder listing).
pub fn resolve(root: &Path, name: &str, allow_root: bool) -> Result<PathBuf> {
    let invalid = |reason| KitsupassError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return if allow_root {
            Ok(root.to_path_buf())
        } else {
            Err(invalid("name cannot be empty"))
        };
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name is too long"));
    }
    if name.contains('\0') || name.contains('\\') {
        return Err(invalid("name contains a forbidden character"));
    }

    let mut path = root.to_path_buf();
    for (i, segment) in name.split('/').enumerate() {
        match segment {
            "" if i == 0 => return Err(invalid("name must be relative")),
            "" => return Err(invalid("name contains an empty segment")),
            "." | ".." => return Err(invalid("name cannot contain '.' or '..'")),
            s if format::is_reserved(s) => return Err(invalid("name is reserved")),
            s => path.push(s),
        }
    }
    Ok(path)
}

/// Render a path below `root` as an entry name with `/` separators.
pub fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Option<Vec<&str>> = relative.iter().map(|s| s.to_str()).collect();
    Some(segments?.join("/"))
}

/// The decrypted text of an entry, split into its conventional parts.
///
/// ```text
/// hunter2                      <- password (first line)
/// username: alice              <- fields ("key: value")
/// URL: https://example.com
/// free-form notes              <- everything else
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryContent {
    pub password: String,
    pub fields: Vec<(String, String)>,
    pub notes: String,
}

impl EntryContent {
    pub fn parse(text: &str) -> Self {
        let mut lines = text.split('\n');
        let password = lines.next().unwrap_or_default().trim().to_string();

        let mut fields = Vec::new();
        let mut notes = String::new();
        for line in lines {
            match line.split_once(": ") {
                Some((key, value)) if is_field_key(key) => {
                    fields.push((key.to_string(), value.trim().to_string()));
                }
                _ => {
                    notes.push_str(line);
                    notes.push('\n');
                }
            }
        }
        // A trailing newline in the entry is not a note.
        if notes.trim().is_empty() {
            notes.clear();
        }

        Self {
            password,
            fields,
            notes,
        }
    }

    /// Look up the first field named `key` (exact match).
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render back to entry text.
    pub fn render(&self) -> String {
        let mut text = self.password.clone();
        for (key, value) in &self.fields {
            text.push('\n');
            text.push_str(key);
            text.push_str(": ");
            text.push_str(value);
        }
        if !self.notes.is_empty() {
            text.push('\n');
            text.push_str(self.notes.trim_end_matches('\n'));
        }
        text
    }
}

/// Field keys are single words: letters, digits, `_` and `-`.
fn is_field_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_nested_name() {
        let root = Path::new("/store");
        assert_eq!(
            resolve(root, "web/example.com", false).unwrap(),
            PathBuf::from("/store/web/example.com")
        );
    }

    #[test]
    fn resolve_root_only_when_allowed() {
        let root = Path::new("/store");
        assert_eq!(resolve(root, "", true).unwrap(), root.to_path_buf());
        assert!(matches!(
            resolve(root, "", false),
            Err(KitsupassError::InvalidName { .. })
        ));
    }

    #[test]
    fn resolve_rejects_escapes() {
        let root = Path::new("/store");
        for name in ["../etc/passwd", "a/../../b", "/etc/passwd", "a//b", "./a", "a\\b"] {
            assert!(
                matches!(resolve(root, name, false), Err(KitsupassError::InvalidName { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn resolve_rejects_marker_and_temp_names() {
        let root = Path::new("/store");
        let marker = format::marker_name(&uuid::Uuid::new_v4());
        assert!(resolve(root, &marker, false).is_err());
        assert!(resolve(root, "web/.site.tmp", false).is_err());
    }

    #[test]
    fn relative_name_uses_forward_slashes() {
        let root = Path::new("/store");
        let path = root.join("web").join("example.com");
        assert_eq!(relative_name(root, &path).unwrap(), "web/example.com");
        assert!(relative_name(root, Path::new("/elsewhere/x")).is_none());
    }

    #[test]
    fn parse_splits_password_fields_and_notes() {
        let content = EntryContent::parse(
            "hunter2\nusername: alice\nURL: https://example.com\nsome notes about this login",
        );
        assert_eq!(content.password, "hunter2");
        assert_eq!(content.field("username"), Some("alice"));
        assert_eq!(content.field("URL"), Some("https://example.com"));
        assert_eq!(content.notes, "some notes about this login\n");
    }

    #[test]
    fn parse_password_only() {
        let content = EntryContent::parse("s3cret\n");
        assert_eq!(content.password, "s3cret");
        assert!(content.fields.is_empty());
        assert!(content.notes.is_empty());
    }

    #[test]
    fn parse_keeps_sentences_with_colons_as_notes() {
        let content = EntryContent::parse("pw\nremember this: it matters");
        assert!(content.fields.is_empty());
        assert_eq!(content.notes, "remember this: it matters\n");
    }

    #[test]
    fn render_roundtrips_parsed_content() {
        let text = "pw\nusername: bob\nTOTP: otpauth://totp/x\nnote line";
        assert_eq!(EntryContent::parse(text).render(), text);
    }
}
