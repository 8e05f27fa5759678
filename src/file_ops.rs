//! File encryption/decryption operations
//!
//! Each operation reads its whole input into memory, transforms it with the
//! container codec, and writes the whole result. There is no streaming.

use crate::container;
use crate::error::{ErrorCategory, ErrorKind, Result, VaultError};
use crate::passphrase::PassphraseReader;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Encrypt a file with a password
///
/// Reads plaintext from `input_path`, encrypts it using a password from
/// `passphrase_reader`, and writes the container to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on Unix systems.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    debug!(input = %input_path.display(), bytes = plaintext.len(), "read plaintext");

    let passphrase = passphrase_reader.read_passphrase()?;
    let sealed = container::encrypt(&plaintext, &passphrase)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_secure(output_path, &sealed)?;

    info!(output = %output_path.display(), bytes = sealed.len(), "wrote container");
    Ok(())
}

/// Decrypt a file with a password
///
/// Reads a container from `input_path`, decrypts it using a password from
/// `passphrase_reader`, and writes the plaintext to `output_path`.
///
/// The output file is only created once decryption has succeeded, so a wrong
/// password or a damaged container never leaves a partial or truncated output.
/// It is created with mode 0o600 on Unix systems.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let sealed = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    debug!(input = %input_path.display(), bytes = sealed.len(), "read container");

    let passphrase = passphrase_reader.read_passphrase()?;
    let plaintext = container::decrypt(&sealed, &passphrase)?;
    write_file_secure(output_path, &plaintext)?;

    info!(output = %output_path.display(), bytes = plaintext.len(), "wrote plaintext");
    Ok(())
}

/// Update an encrypted file with new plaintext using the same password
///
/// This function:
/// 1. Decrypts the existing file at `crypt_path` to validate the password
/// 2. Reads new plaintext from `plain_path`
/// 3. Encrypts the new plaintext with the validated password
/// 4. Atomically writes to `crypt_path` (tempfile + fsync + rename)
///
/// The atomic write ensures that either the old file or the new file exists,
/// never a partial/corrupted file.
///
/// The password validation prevents accidental password changes.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
) -> Result<()> {
    let existing = fs::read(crypt_path).map_err(|e| read_error(crypt_path, e))?;
    let passphrase = passphrase_reader.read_passphrase()?;

    // Validate password by decrypting existing file (discard plaintext)
    container::decrypt(&existing, &passphrase)?;
    debug!(container = %crypt_path.display(), "existing container verified");

    let new_plaintext = fs::read(plain_path).map_err(|e| read_error(plain_path, e))?;
    let new_sealed = container::encrypt(&new_plaintext, &passphrase)
        .map_err(|e| e.with_context("encryption failed"))?;

    // Great, let's re-write it (atomically).
    let crypt_dir = match crypt_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => {
            return Err(VaultError::with_kind(
                ErrorCategory::User,
                ErrorKind::OutputUnwritable,
                "crypt_path has no parent directory",
            ));
        }
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(crypt_dir)
        .map_err(|e| write_error("failed to create tempfile", e))?;

    temp_file
        .write_all(&new_sealed)
        .map_err(|e| write_error("failed to write to tempfile", e))?;
    // Flush and fsync() such that the rename later, if it succeeds, will
    // always point to a valid file.
    temp_file
        .flush()
        .map_err(|e| write_error("failed to flush tempfile", e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| write_error("failed to sync file prior to rename", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = temp_file
            .as_file()
            .metadata()
            .map_err(|e| write_error("failed to get tempfile metadata", e))?
            .permissions();
        perms.set_mode(0o600);
        temp_file
            .as_file()
            .set_permissions(perms)
            .map_err(|e| write_error("failed to set tempfile permissions", e))?;
    }
    temp_file.persist(crypt_path).map_err(|e| {
        write_error(
            format!("failed to rename to target file {}", crypt_path.display()),
            e.error,
        )
    })?;

    info!(container = %crypt_path.display(), bytes = new_sealed.len(), "replaced container");
    Ok(())
}

/// Write file with secure permissions (0o600 on Unix)
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| write_error(format!("failed to open {}", path.display()), e))?;

        file.write_all(contents)
            .map_err(|e| write_error(format!("failed to write {}", path.display()), e))?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
            .map_err(|e| write_error(format!("failed to write {}", path.display()), e))
    }
}

fn read_error(path: &Path, err: io::Error) -> VaultError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    VaultError::with_kind_and_source(
        category,
        ErrorKind::InputUnavailable,
        format!("failed to read from {}", path.display()),
        err,
    )
}

fn write_error(msg: impl Into<String>, err: io::Error) -> VaultError {
    let category = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ErrorCategory::User,
        _ => ErrorCategory::Internal,
    };
    VaultError::with_kind_and_source(category, ErrorKind::OutputUnwritable, msg, err)
}
