//! Common utilities and types shared across SealBox crates.
//!
//! This crate provides the shared error type, the hexadecimal field codec
//! used by the container wire format, and a zeroizing byte buffer.

pub mod encoding;
pub mod error;
pub mod types;

pub use encoding::{decode_hex, decode_hex_array, encode_hex, into_array};
pub use error::{Error, Result};
pub use types::SensitiveBytes;
