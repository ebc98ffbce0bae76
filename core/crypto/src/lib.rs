//! Cryptographic primitives for SealBox.
//!
//! This module provides:
//! - Cost calibration for password-based key derivation
//! - Key derivation using PBKDF2-HMAC-SHA256
//! - Encryption using AES-256 in counter mode
//! - A SHA-256 content digest used as the container's integrity tag
//! - Pluggable randomness for salts and IVs
//!
//! # Security Notes
//! - Derived keys are zeroized on drop and never logged
//! - The integrity tag is an unkeyed digest, not a MAC (see [`digest`])
//! - The calibrator's PRNG only picks a cost factor; salts and IVs always
//!   come from a [`RandomSource`]

pub mod calibrate;
pub mod cipher;
pub mod digest;
pub mod kdf;
pub mod keys;
pub mod random;

pub use calibrate::{CalibrationParams, Calibrator, FixedIterations, IterationSource};
pub use cipher::{decrypt, encrypt, BLOCK_SIZE};
pub use digest::{Digest, DIGEST_SIZE};
pub use kdf::{derive_key, MIN_ITERATIONS};
pub use keys::{DerivedKey, Iv, Salt, IV_LENGTH, KEY_LENGTH, SALT_LENGTH};
pub use random::{OsRandom, RandomSource};
