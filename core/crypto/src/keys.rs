//! Key, salt and IV types.
//!
//! The derived key zeroizes its memory on drop so key material does not
//! outlive a single `seal` or `open` call.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::random::RandomSource;
use sealbox_common::Result;

/// Length of the derived encryption key in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Length of the key derivation salt in bytes.
pub const SALT_LENGTH: usize = 12;

/// Length of the counter-mode IV in bytes.
pub const IV_LENGTH: usize = 16;

/// Symmetric key stretched from a password.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey([REDACTED])")
    }
}

/// Salt for key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Draw a fresh salt from the given random source.
    ///
    /// # Errors
    /// - Returns `Error::Randomness` if the source fails
    pub fn generate(rng: &dyn RandomSource) -> Result<Self> {
        let mut salt = [0u8; SALT_LENGTH];
        rng.fill(&mut salt)?;
        Ok(Self(salt))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

/// Initialization vector for the counter-mode keystream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv([u8; IV_LENGTH]);

impl Iv {
    /// Draw a fresh IV from the given random source.
    ///
    /// # Errors
    /// - Returns `Error::Randomness` if the source fails
    pub fn generate(rng: &dyn RandomSource) -> Result<Self> {
        let mut iv = [0u8; IV_LENGTH];
        rng.fill(&mut iv)?;
        Ok(Self(iv))
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; IV_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the IV bytes.
    pub fn as_bytes(&self) -> &[u8; IV_LENGTH] {
        &self.0
    }
}
