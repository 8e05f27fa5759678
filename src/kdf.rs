//! Password-based key derivation
//!
//! Keys are derived with PBKDF2-HMAC-SHA256. The iteration count is part of
//! the `CVLT1` format: every container carrying that magic was produced with
//! exactly [`ITERATIONS`] rounds, so it must never change without a new magic.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Length of salt in bytes
pub const SALT_LEN: usize = 16;

/// Length of derived key in bytes
pub const KEY_LEN: usize = 32;

/// PBKDF2 round count for `CVLT1` containers
pub const ITERATIONS: u32 = 200_000;

/// Derive a 32-byte key from a password and salt
///
/// Any password is accepted, including the empty one; rejecting weak
/// passwords is left to callers. The result is wiped when dropped.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password, salt, ITERATIONS, key.as_mut_slice());
    key
}
