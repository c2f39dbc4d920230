//! Builds the browser-facing view of store entries.
//!
//! Runs on the blocking pool with the vault locked.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::{KitsupassError, Result};
use crate::vault::{EntryContent, Vault};

use super::models::{Item, ItemProperties, NewEntry, Otp, Source};

/// Version stamp of the vault facade format.
pub const FACADE_VERSION: &str = "1.0.0";

/// Field keys with a dedicated item property.
const USERNAME: &str = "username";
const URL: &str = "URL";
const TOTP: &str = "TOTP";

/// Marker in entry names that flags a one-time-password entry.
pub const OTP_MARKER: &str = "otp:";

/// Decrypt `name` if the store is open.
///
/// A closed store yields `None`. Any other failure is logged and also
/// yields `None`, so one damaged entry does not break a whole listing.
fn read_content(vault: &Vault, name: &str) -> Option<EntryContent> {
    match vault.show(name) {
        Ok(text) => Some(EntryContent::parse(&text)),
        Err(KitsupassError::Locked) => None,
        Err(e) => {
            tracing::warn!(name, error = %e, "entry unreadable, listing without secrets");
            None
        }
    }
}

/// Build items for `names`.
pub fn items(vault: &Vault, id: &Uuid, names: &[String]) -> Vec<Item> {
    names
        .iter()
        .map(|name| item(id, name, read_content(vault, name)))
        .collect()
}

fn item(id: &Uuid, name: &str, content: Option<EntryContent>) -> Item {
    let mut properties = ItemProperties {
        title: name.to_string(),
        ..ItemProperties::default()
    };

    if let Some(content) = content {
        properties.password = Some(content.password.clone());
        for (key, value) in &content.fields {
            match key.as_str() {
                USERNAME => properties.username = Some(value.clone()),
                URL => properties.url = Some(value.clone()),
                _ => properties.note.push_str(&format!("{key}: {value}\n")),
            }
        }
        properties.note.push_str(&content.notes);
    }

    Item {
        entry_type: "website",
        group_id: "0",
        id: name.to_string(),
        properties,
        tags: Vec::new(),
        source_id: id.to_string(),
        vault_id: id.to_string(),
        urls: Vec::new(),
    }
}

/// One-time-password entries: names containing `otp:`.
pub fn otps(vault: &Vault, id: &Uuid) -> Result<Vec<Otp>> {
    let entries = vault.find(OTP_MARKER)?;
    Ok(entries
        .iter()
        .map(|name| {
            let content = read_content(vault, &name);
            let field = |key: &str| {
                content
                    .as_ref()
                    .and_then(|c| c.field(key))
                    .map(str::to_string)
            };
            Otp {
                source_id: id.to_string(),
                entry_title: name.clone(),
                login_url: field(URL),
                otp_url: field(TOTP),
                entry_id: name,
                entry_property: TOTP,
            }
        })
        .collect())
}

/// Display name of the store: its directory name.
pub fn store_name(vault: &Vault) -> String {
    vault
        .root()
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("kitsupass")
        .to_string()
}

pub fn source(vault: &Vault, id: &Uuid) -> Source {
    Source {
        id: id.to_string(),
        name: store_name(vault),
        state: if vault.is_open() { "unlocked" } else { "locked" },
        source_type: "file",
        order: 0,
        format: "a",
    }
}

/// The single-group tree of every entry in the store.
pub fn tree(vault: &Vault, id: &Uuid) -> Result<Value> {
    let id = id.to_string();
    let entries: Vec<Value> = vault
        .find("")?
        .iter()
        .map(|name| json!({ "id": name, "type": "website", "parentID": "0" }))
        .collect();

    Ok(json!({
        "tree": {
            &id: {
                "_tag": &id,
                "_ver": FACADE_VERSION,
                "type": "vault",
                "id": &id,
                "attributes": {},
                "groups": [{
                    "type": "group",
                    "id": "0",
                    "title": "Default",
                    "attributes": {},
                    "parentID": &id,
                }],
                "entries": entries,
            }
        },
        "names": { &id: store_name(vault) },
    }))
}

/// Turn a browser "save entry" payload into an entry name and its text.
///
/// The name is the host of `URL` when there is one, else `title`.
pub fn new_entry(payload: &NewEntry) -> Result<(String, String)> {
    let props = &payload.properties;
    let url = props.get(URL).filter(|u| !u.is_empty());

    let name = url
        .and_then(|u| host_of(u))
        .or_else(|| props.get("title").filter(|t| !t.is_empty()).cloned())
        .ok_or_else(|| KitsupassError::BadRequest("entry needs a URL or a title".into()))?;
    // A host or title may not contain a path separator.
    let name = name.replace('/', "_");

    let mut content = EntryContent {
        password: props.get("password").cloned().unwrap_or_default(),
        ..EntryContent::default()
    };
    if let Some(username) = props.get(USERNAME).filter(|u| !u.is_empty()) {
        content.fields.push((USERNAME.to_string(), username.clone()));
    }
    if let Some(url) = url {
        content.fields.push((URL.to_string(), url.clone()));
    }
    for (key, value) in props {
        if matches!(key.as_str(), "password" | USERNAME | URL) || value.is_empty() {
            continue;
        }
        content.fields.push((key.clone(), value.clone()));
    }

    Ok((name, content.render()))
}

/// The host part of an absolute URL.
pub fn host_of(url: &str) -> Option<String> {
    url.parse::<axum::http::Uri>()
        .ok()
        .and_then(|uri| uri.host().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn payload(props: &[(&str, &str)]) -> NewEntry {
        NewEntry {
            entry_type: "website".into(),
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn host_of_absolute_url() {
        assert_eq!(
            host_of("https://login.example.com:8443/path?q=1").as_deref(),
            Some("login.example.com")
        );
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn item_splits_fields_into_properties() {
        let content = EntryContent::parse("pw\nusername: alice\nURL: https://a.b\nTOTP: x\nnote");
        let item = item(&Uuid::nil(), "a.b", Some(content));
        assert_eq!(item.properties.password.as_deref(), Some("pw"));
        assert_eq!(item.properties.username.as_deref(), Some("alice"));
        assert_eq!(item.properties.url.as_deref(), Some("https://a.b"));
        assert_eq!(item.properties.note, "TOTP: x\nnote\n");
    }

    #[test]
    fn new_entry_named_after_host() {
        let (name, text) = new_entry(&payload(&[
            ("title", "Example"),
            ("password", "pw"),
            ("username", "bob"),
            ("URL", "https://www.example.com/login"),
        ]))
        .unwrap();
        assert_eq!(name, "www.example.com");
        assert_eq!(
            text,
            "pw\nusername: bob\nURL: https://www.example.com/login\ntitle: Example"
        );
    }

    #[test]
    fn new_entry_falls_back_to_title() {
        let (name, _) = new_entry(&payload(&[("title", "Bank/PIN"), ("password", "1234")])).unwrap();
        assert_eq!(name, "Bank_PIN");
    }

    #[test]
    fn new_entry_needs_a_name() {
        assert!(matches!(
            new_entry(&payload(&[("password", "pw")])),
            Err(KitsupassError::BadRequest(_))
        ));
    }
}
