//! Encryption/decryption using PBKDF2 + AES-256-GCM
//!
//! This module implements password-based encryption using:
//! - PBKDF2-HMAC-SHA256 for key derivation from the password (see [`crate::kdf`])
//! - AES-256-GCM for authenticated encryption
//!
//! The binary format is:
//! - magic: 5 bytes (ASCII `CVLT1`)
//! - salt: 16 bytes
//! - nonce: 12 bytes
//! - ciphertext: variable length, followed by the 16-byte GCM tag
//!
//! There is no length field; the ciphertext runs to the end of the input.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{ErrorCategory, ErrorKind, Result, VaultError};
use crate::kdf::{self, SALT_LEN};

/// Format and version marker at the start of every container
pub const MAGIC: &[u8; MAGIC_LEN] = b"CVLT1";

/// Length of the magic marker in bytes
pub const MAGIC_LEN: usize = 5;

/// Length of nonce in bytes
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag in bytes
pub const TAG_LEN: usize = 16;

/// Offset of the ciphertext within a container
pub const HEADER_LEN: usize = MAGIC_LEN + SALT_LEN + NONCE_LEN;

/// Size of the container for an empty plaintext
pub const MIN_CONTAINER_LEN: usize = HEADER_LEN + TAG_LEN;

/// A container split into its fields. Only produced once the length and magic
/// have been checked.
struct Parsed<'a> {
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    sealed: &'a [u8],
}

fn parse(container: &[u8]) -> Result<Parsed<'_>> {
    if !is_container(container) {
        return Err(VaultError::undecryptable(ErrorKind::FormatMismatch));
    }

    let (salt, rest) = container[MAGIC_LEN..].split_at(SALT_LEN);
    let (nonce, sealed) = rest.split_at(NONCE_LEN);

    Ok(Parsed {
        salt: salt.try_into().map_err(|_| invariant("salt slice has wrong length"))?,
        nonce: nonce
            .try_into()
            .map_err(|_| invariant("nonce slice has wrong length"))?,
        sealed,
    })
}

fn invariant(msg: &str) -> VaultError {
    VaultError::with_kind(ErrorCategory::Internal, ErrorKind::InternalInvariant, msg)
}

/// Fill `buf` from the operating system's secure random generator
///
/// There is deliberately no fallback: if the OS cannot deliver randomness
/// the operation is aborted.
fn fill_random(buf: &mut [u8], what: &str) -> Result<()> {
    OsRng.try_fill_bytes(buf).map_err(|e| {
        VaultError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::RandomSourceExhausted,
            format!("secure random generator failed while generating {}", what),
            e,
        )
    })
}

/// Returns true if `bytes` is long enough to be a container and starts with
/// the expected magic. No cryptographic check is performed.
pub fn is_container(bytes: &[u8]) -> bool {
    bytes.len() >= MIN_CONTAINER_LEN && bytes.starts_with(MAGIC)
}

/// Encrypt plaintext with a password using random salt and nonce
///
/// Returns the container: magic(5) + salt(16) + nonce(12) + ciphertext+tag(variable)
pub fn encrypt(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt, "salt")?;

    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce, "nonce")?;

    encrypt_deterministic(plaintext, password, &salt, &nonce)
}

/// Encrypt plaintext with a password using provided salt and nonce
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` which generates random salt/nonce.
pub fn encrypt_deterministic(
    plaintext: &[u8],
    password: &[u8],
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> Result<Vec<u8>> {
    let key = kdf::derive_key(password, salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));

    let sealed = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| {
            VaultError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::CipherFailure,
                "AES-256-GCM encryption failed",
            )
        })?;

    let mut output = Vec::with_capacity(HEADER_LEN + sealed.len());
    output.extend_from_slice(MAGIC);
    output.extend_from_slice(salt);
    output.extend_from_slice(nonce);
    output.extend_from_slice(&sealed);

    Ok(output)
}

/// Decrypt a container with a password
///
/// Fails with `FormatMismatch` before any key derivation if the input is too
/// short or has the wrong magic, and with `AuthenticationFailed` if the tag
/// does not verify. Both carry the same message. No plaintext is returned
/// unless authentication succeeded.
pub fn decrypt(container: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let parsed = parse(container)?;

    let key = kdf::derive_key(password, &parsed.salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));

    cipher
        .decrypt(Nonce::from_slice(&parsed.nonce), parsed.sealed)
        .map_err(|_| VaultError::undecryptable(ErrorKind::AuthenticationFailed))
}
