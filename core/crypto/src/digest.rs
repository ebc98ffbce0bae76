//! Integrity tag for container contents.
//!
//! The tag is a plain SHA-256 digest of the plaintext, computed before
//! encryption and recomputed after decryption. It is NOT keyed. It catches
//! corruption and wrong-password decryption (garbage plaintext hashes
//! differently), but anyone who can compute SHA-256 can forge a matching
//! tag for chosen plaintext. The record format still labels it `HMAC`;
//! switching to a keyed MAC would change the wire format.

use sha2::{Digest as _, Sha256};
use subtle::ConstantTimeEq;

use sealbox_common::{Error, Result};

/// Digest size in bytes (SHA-256).
pub const DIGEST_SIZE: usize = 32;

/// SHA-256 digest of a plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    /// Compute the digest of `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Check that `data` hashes to this digest.
    ///
    /// Comparison is constant-time.
    ///
    /// # Errors
    /// - Returns `Error::IntegrityMismatch` if the digests differ
    pub fn verify(&self, data: &[u8]) -> Result<()> {
        let actual = Self::compute(data);
        if bool::from(actual.0.ct_eq(&self.0)) {
            Ok(())
        } else {
            Err(Error::IntegrityMismatch)
        }
    }
}
