//! Encryption using AES-256 in counter mode.
//!
//! Payload layout: `[0u8; BLOCK_SIZE] || ciphertext`. The leading block is
//! a zero-filled reservation kept for wire compatibility. It is never run
//! through the keystream and carries no information; the IV alone
//! positions the keystream.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};

use sealbox_common::{Error, Result};

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// AES block size in bytes, and the length of the reserved payload prefix.
pub const BLOCK_SIZE: usize = 16;

fn init(key: &[u8], iv: &[u8]) -> Result<Aes256Ctr> {
    Aes256Ctr::new_from_slices(key, iv).map_err(|e| {
        Error::CipherInit(format!(
            "key of {} bytes / IV of {} bytes rejected: {}",
            key.len(),
            iv.len(),
            e
        ))
    })
}

/// Encrypt plaintext under `key` and `iv`.
///
/// # Postconditions
/// - Output length is `BLOCK_SIZE + plaintext.len()`
/// - The first BLOCK_SIZE bytes are zero
///
/// # Errors
/// - Returns `Error::CipherInit` if the key is not 32 bytes or the IV not 16
pub fn encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut cipher = init(key, iv)?;

    let mut payload = vec![0u8; BLOCK_SIZE + plaintext.len()];
    payload[BLOCK_SIZE..].copy_from_slice(plaintext);
    cipher.apply_keystream(&mut payload[BLOCK_SIZE..]);

    Ok(payload)
}

/// Decrypt a payload produced by [`encrypt`].
///
/// There is no authentication here: a wrong key or IV yields garbage of
/// the same length. Callers must check the integrity tag.
///
/// # Errors
/// - Returns `Error::MalformedRecord` if the payload is shorter than BLOCK_SIZE
/// - Returns `Error::CipherInit` if the key or IV length is invalid
pub fn decrypt(key: &[u8], iv: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() < BLOCK_SIZE {
        return Err(Error::MalformedRecord(format!(
            "encrypted payload is {} bytes, expected at least {}",
            payload.len(),
            BLOCK_SIZE
        )));
    }

    let mut cipher = init(key, iv)?;

    let mut plaintext = payload[BLOCK_SIZE..].to_vec();
    cipher.apply_keystream(&mut plaintext);

    Ok(plaintext)
}
