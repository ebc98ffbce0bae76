//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! The password is stretched with a per-container salt and iteration
//! count into a 256-bit key for the counter-mode cipher.

use sha2::Sha256;

use crate::keys::{DerivedKey, Salt, KEY_LENGTH};
use sealbox_common::{Error, Result};

/// Minimum iteration count produced when sealing.
pub const MIN_ITERATIONS: u32 = 4096;

/// Derive an encryption key from a password and salt.
///
/// # Preconditions
/// - `iterations` must be non-zero
///
/// # Postconditions
/// - Returns a key of KEY_LENGTH bytes
/// - The derived key is deterministic given the same inputs
///
/// # Errors
/// - Returns error if `iterations` is zero
///
/// # Security
/// - Password is not stored or logged
pub fn derive_key(password: &[u8], salt: &Salt, iterations: u32) -> Result<DerivedKey> {
    pbkdf2_sha256(password, salt.as_bytes(), iterations)
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> Result<DerivedKey> {
    if iterations == 0 {
        return Err(Error::InvalidInput(
            "Iteration count must be positive".to_string(),
        ));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key_bytes);

    Ok(DerivedKey::from_bytes(key_bytes))
}
