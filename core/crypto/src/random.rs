//! Randomness provider for salts and IVs.
//!
//! Salt and IV bytes come from a [`RandomSource`] so callers and tests can
//! substitute their own generator. Production code uses [`OsRandom`].

use rand::rngs::OsRng;
use rand::RngCore;

use sealbox_common::{Error, Result};

/// A source of random bytes for salts and IVs.
pub trait RandomSource: Send + Sync {
    /// Fill `buf` completely with random bytes.
    ///
    /// # Errors
    /// - Returns `Error::Randomness` if the source cannot produce bytes
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// The operating system's cryptographically secure generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| Error::Randomness(e.to_string()))
    }
}
