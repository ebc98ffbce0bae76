//! Hexadecimal codec for binary record fields.
//!
//! Binary values travel as lowercase hex strings. Decoding distinguishes
//! between text that is not hex at all ([`Error::Decode`]) and well-formed
//! hex of the wrong length ([`Error::MalformedRecord`]).

use crate::{Error, Result};

/// Encode bytes as a lowercase hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string belonging to the named field.
///
/// # Errors
/// - Returns `Error::Decode` on invalid characters or odd length
pub fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| Error::Decode(format!("{}: {}", field, e)))
}

/// Decode a hex string into a fixed-size array.
///
/// # Errors
/// - Returns `Error::Decode` if the value is not valid hex
/// - Returns `Error::MalformedRecord` if it decodes to the wrong length
pub fn decode_hex_array<const N: usize>(field: &str, value: &str) -> Result<[u8; N]> {
    into_array(field, decode_hex(field, value)?)
}

/// Convert already-decoded bytes into a fixed-size array.
///
/// # Errors
/// - Returns `Error::MalformedRecord` if `bytes` is not exactly `N` long
pub fn into_array<const N: usize>(field: &str, bytes: Vec<u8>) -> Result<[u8; N]> {
    bytes.as_slice().try_into().map_err(|_| {
        Error::MalformedRecord(format!(
            "{}: expected {} bytes, got {}",
            field,
            N,
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_value() {
        let bytes = decode_hex("data", "48656c6c6f20576f726c64").unwrap();
        assert_eq!(bytes, b"Hello World");
    }

    #[test]
    fn test_encode_is_lowercase() {
        assert_eq!(encode_hex(&[0xAB, 0xCD, 0x01]), "abcd01");
    }

    #[test]
    fn test_decode_invalid_characters() {
        let err = decode_hex("Salt", "invalid_hex").unwrap_err();
        assert!(matches!(err, Error::Decode(ref msg) if msg.starts_with("Salt")));
    }

    #[test]
    fn test_decode_odd_length() {
        assert!(matches!(decode_hex("IV", "abc"), Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_array_wrong_length() {
        let result = decode_hex_array::<4>("IV", "aabbcc");
        assert!(matches!(result, Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn test_into_array_wrong_length() {
        let result = into_array::<2>("Salt", vec![1, 2, 3]);
        assert!(matches!(result, Err(Error::MalformedRecord(ref msg)) if msg.starts_with("Salt")));
    }

    #[test]
    fn test_decode_array_exact_length() {
        let arr = decode_hex_array::<3>("IV", "aabbcc").unwrap();
        assert_eq!(arr, [0xaa, 0xbb, 0xcc]);
    }
}
