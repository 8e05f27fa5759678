//! Golden test vector validation

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use ciphervault::container::{self, NONCE_LEN};
use ciphervault::kdf::SALT_LEN;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoldenVector {
    plaintext: String,
    passphrase: String,
    salt: String,
    nonce: String,
    container: String,
    comment: String,
}

fn load_golden_vectors() -> Vec<GoldenVector> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    serde_json::from_str(json_data).expect("failed to parse golden vectors")
}

fn decode(field: &str, value: &str) -> Vec<u8> {
    BASE64_STANDARD
        .decode(value)
        .unwrap_or_else(|e| panic!("failed to decode {}: {}", field, e))
}

/// Check one vector: deterministic encryption must reproduce the stored
/// container byte for byte, and decrypting it must give the plaintext back.
fn check_vector(i: usize, vector: &GoldenVector) -> Result<(), String> {
    let plaintext = decode("plaintext", &vector.plaintext);
    let passphrase = decode("passphrase", &vector.passphrase);
    let expected = decode("container", &vector.container);

    let salt: [u8; SALT_LEN] = decode("salt", &vector.salt)
        .try_into()
        .map_err(|s: Vec<u8>| format!("salt must be {} bytes, got {}", SALT_LEN, s.len()))?;
    let nonce: [u8; NONCE_LEN] = decode("nonce", &vector.nonce)
        .try_into()
        .map_err(|n: Vec<u8>| format!("nonce must be {} bytes, got {}", NONCE_LEN, n.len()))?;

    let encrypted = container::encrypt_deterministic(&plaintext, &passphrase, &salt, &nonce)
        .map_err(|e| format!("failed to encrypt - {}", e))?;
    if encrypted != expected {
        return Err(format!(
            "container mismatch (expected {} bytes, got {})",
            expected.len(),
            encrypted.len()
        ));
    }

    let decrypted = container::decrypt(&expected, &passphrase)
        .map_err(|e| format!("failed to decrypt - {}", e))?;
    if decrypted != plaintext {
        return Err(format!(
            "plaintext mismatch (expected {} bytes, got {})",
            plaintext.len(),
            decrypted.len()
        ));
    }

    println!("Vector {}: ok ({})", i, vector.comment);
    Ok(())
}

#[test]
fn test_golden_vectors() {
    let vectors = load_golden_vectors();
    assert!(!vectors.is_empty(), "No golden vectors were loaded");

    let failures: Vec<String> = vectors
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            check_vector(i, v)
                .err()
                .map(|e| format!("Vector {} ({}): {}", i, v.comment, e))
        })
        .collect();

    assert!(failures.is_empty(), "golden vectors failed:\n{}", failures.join("\n"));
}

#[test]
fn test_golden_containers_reject_wrong_passphrase() {
    let vectors = load_golden_vectors();
    let vector = vectors
        .iter()
        .find(|v| !v.passphrase.is_empty())
        .expect("need a vector with a non-empty passphrase");

    let mut passphrase = decode("passphrase", &vector.passphrase);
    passphrase.push(b'!');

    let err = container::decrypt(&decode("container", &vector.container), &passphrase)
        .expect_err("wrong passphrase must not decrypt");
    assert!(err.is_undecryptable());
    assert_eq!(err.kind, Some(ciphervault::ErrorKind::AuthenticationFailed));
}
