//! Integration tests for entry encryption and the bridge envelope.

use std::io::Write;
use std::process::{Command, Stdio};

use kitsupass::crypto::envelope;
use kitsupass::crypto::{decrypt, encrypt, encrypt_with_salt};
use kitsupass::errors::KitsupassError;

const SALT: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

// ---------------------------------------------------------------------------
// Entry blobs
// ---------------------------------------------------------------------------

#[test]
fn known_answer_single_block() {
    let blob = encrypt_with_salt("plaintext", "password", &SALT).unwrap();
    assert_eq!(blob, "U2FsdGVkX18BAgMEBQYHCE5i1YRXc1ZWGc0WCZenocs=\n");
}

#[test]
fn known_answer_wraps_at_64_columns() {
    let text = "hunter2\nusername: alice\nURL: https://example.com\nsome notes about this login";
    let blob = encrypt_with_salt(text, "password", &SALT).unwrap();
    assert_eq!(
        blob,
        "U2FsdGVkX18BAgMEBQYHCNWNttfpqx1Wn5X2SITznID0nyV0RClAqQCJwZlrI90M\n\
         0s+EaBhbUk27aqANgIm/jg1ar7YO1+FRTKj2N96SH3UhrCK73kiz1e5p9jp7/qVh\n"
    );
    assert_eq!(decrypt(&blob, "password").unwrap(), text);
}

#[test]
fn decrypts_blob_written_by_openssl() {
    let blob = "U2FsdGVkX1+qzTL8WeOnlddJVgjs9vvwOa2xbI1D8tY=\n";
    assert_eq!(decrypt(blob, "password").unwrap(), "plaintext");
}

#[test]
fn random_salt_changes_ciphertext() {
    let a = encrypt("same", "pw").unwrap();
    let b = encrypt("same", "pw").unwrap();
    assert_ne!(a, b);
    assert_eq!(decrypt(&a, "pw").unwrap(), "same");
    assert_eq!(decrypt(&b, "pw").unwrap(), "same");
}

#[test]
fn empty_and_unicode_plaintext() {
    for text in ["", "päss wörd ✓", "line one\nline two\n"] {
        let blob = encrypt(text, "pw").unwrap();
        assert_eq!(decrypt(&blob, "pw").unwrap(), text);
    }
}

#[test]
fn wrong_password_fails_authentication() {
    let blob = encrypt_with_salt("plaintext", "password", &SALT).unwrap();
    // PKCS#7 padding occasionally survives a wrong key, so check a few.
    let failures = ["wrong", "Password", "password1", "hunter2"]
        .iter()
        .filter(|pw| decrypt(&blob, pw).is_err())
        .count();
    assert!(failures >= 3);
}

#[test]
fn undecodable_blob_fails_authentication() {
    let err = decrypt("%%% not base64 %%%", "pw").unwrap_err();
    assert!(matches!(err, KitsupassError::Authentication));
    assert_eq!(err.to_string(), "Invalid password or corrupted entry");
}

#[test]
fn blob_without_header_is_a_format_error() {
    let err = decrypt("aGVsbG8gd29ybGQ=\n", "pw").unwrap_err();
    assert!(matches!(err, KitsupassError::Format(_)));
    assert_eq!(err.to_string(), "Invalid password or corrupted entry");
}

/// Cross-check with the real tool when it is installed.
#[test]
fn openssl_tool_decrypts_our_output() {
    let blob = encrypt("from kitsupass", "password").unwrap();

    let child = Command::new("openssl")
        .args([
            "aes-256-cbc", "-d", "-a", "-pbkdf2", "-md", "sha256", "-iter", "10000", "-pass",
            "pass:password",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn();
    let Ok(mut child) = child else {
        eprintln!("openssl not installed, skipping");
        return;
    };

    child
        .stdin
        .take()
        .unwrap()
        .write_all(blob.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "from kitsupass");
}

// ---------------------------------------------------------------------------
// Bridge envelope
// ---------------------------------------------------------------------------

const SECRET: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

#[test]
fn envelope_roundtrip() {
    let sealed = envelope::seal(SECRET, br#"{"term":"mail"}"#).unwrap();
    assert_eq!(sealed.split('$').count(), 6);
    assert!(sealed.ends_with("$100000$gcm"));
    assert_eq!(envelope::open(SECRET, &sealed).unwrap(), br#"{"term":"mail"}"#);
}

#[test]
fn envelope_tampering_is_detected() {
    let sealed = envelope::seal(SECRET, b"payload").unwrap();
    let fields: Vec<&str> = sealed.split('$').collect();

    let replacements = [
        (0, envelope::seal(SECRET, b"payloaD").unwrap().split('$').next().unwrap().to_string()),
        (1, "00".repeat(16)),
        (2, "abcdefghijkl".to_string()),
        (3, "00".repeat(16)),
        (4, "99999".to_string()),
        (5, "cbc".to_string()),
    ];

    for (index, replacement) in replacements {
        let mut altered: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        if altered[index] == replacement {
            continue;
        }
        altered[index] = replacement;
        let result = envelope::open(SECRET, &altered.join("$"));
        assert!(
            matches!(result, Err(KitsupassError::Authentication)),
            "field {index} tampering not detected"
        );
    }
}

#[test]
fn envelope_needs_six_fields() {
    assert!(matches!(
        envelope::open(SECRET, "a$b$c"),
        Err(KitsupassError::Format(_))
    ));
}
