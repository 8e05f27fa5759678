//! Ciphervault - Password-based file encryption using PBKDF2 and AES-256-GCM

#![forbid(unsafe_code)]

pub mod container;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod passphrase;

pub use container::{decrypt, encrypt};
pub use error::{ErrorCategory, ErrorKind, Result, VaultError};
