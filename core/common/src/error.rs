//! Common error types for SealBox.

use thiserror::Error;

/// Top-level error type for SealBox operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The system random source failed while drawing salt or IV bytes.
    #[error("Randomness failure: {0}")]
    Randomness(String),

    /// A hex-encoded field could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The record is structurally invalid.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The recomputed digest does not match the stored one.
    ///
    /// The wording predates the tag being documented as an unkeyed
    /// digest and is kept verbatim for compatibility.
    #[error("HMAC mismatch")]
    IntegrityMismatch,

    /// The cipher rejected the key or IV.
    #[error("Cipher initialization failed: {0}")]
    CipherInit(String),

    /// Invalid input provided to a primitive.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization of a record failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
