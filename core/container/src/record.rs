//! The container record and its JSON wire form.
//!
//! A record has four sections. Binary values are stored as lowercase hex
//! strings so the whole record is plain JSON:
//!
//! ```json
//! {
//!   "ContainerMeta":  { "Version": "v1.0" },
//!   "DeriveInfo":     { "Salt": "<24 hex>", "Iters": 4096 },
//!   "EncryptionInfo": { "IV": "<32 hex>" },
//!   "ContainedData":  { "EncryptedData": "<hex>", "HMAC": "<64 hex>" }
//! }
//! ```

use serde::{Deserialize, Serialize};

use sealbox_common::{decode_hex, encode_hex, into_array, Error, Result};
use sealbox_crypto::{Digest, Iv, Salt, BLOCK_SIZE, DIGEST_SIZE, IV_LENGTH, SALT_LENGTH};

/// Format tag written by this version of the library.
pub const CURRENT_VERSION: &str = "v1.0";

/// Record metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerMeta {
    #[serde(rename = "Version")]
    version: String,
}

impl ContainerMeta {
    /// Format version tag.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Key derivation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveInfo {
    #[serde(rename = "Salt")]
    salt: String,
    #[serde(rename = "Iters")]
    iterations: u32,
}

impl DeriveInfo {
    /// Hex-encoded salt.
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// PBKDF2 iteration count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// Cipher parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionInfo {
    #[serde(rename = "IV")]
    iv: String,
}

impl EncryptionInfo {
    /// Hex-encoded IV.
    pub fn iv(&self) -> &str {
        &self.iv
    }
}

/// Encrypted payload and integrity tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainedData {
    #[serde(rename = "EncryptedData")]
    encrypted_data: String,
    /// Unkeyed SHA-256 of the plaintext; the name is kept for compatibility.
    #[serde(rename = "HMAC")]
    digest: String,
}

impl ContainedData {
    /// Hex-encoded encrypted payload.
    pub fn encrypted_data(&self) -> &str {
        &self.encrypted_data
    }

    /// Hex-encoded plaintext digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

/// A sealed container.
///
/// Records are built in one step by [`ContainerRecord::assemble`] or
/// parsed from JSON, and are never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    #[serde(rename = "ContainerMeta")]
    meta: ContainerMeta,
    #[serde(rename = "DeriveInfo")]
    derive_info: DeriveInfo,
    #[serde(rename = "EncryptionInfo")]
    encryption_info: EncryptionInfo,
    #[serde(rename = "ContainedData")]
    contained_data: ContainedData,
}

/// The binary contents of a record after validation.
#[derive(Debug, Clone)]
pub struct DecodedRecord {
    /// Format version tag, unchecked.
    pub version: String,
    /// Key derivation salt.
    pub salt: Salt,
    /// PBKDF2 iteration count, non-zero.
    pub iterations: u32,
    /// Counter-mode IV.
    pub iv: Iv,
    /// Zero prefix followed by ciphertext, at least one block long.
    pub payload: Vec<u8>,
    /// Stored plaintext digest.
    pub digest: Digest,
}

impl ContainerRecord {
    /// Build a fully populated record.
    pub fn assemble(
        version: impl Into<String>,
        salt: &Salt,
        iterations: u32,
        iv: &Iv,
        payload: &[u8],
        digest: &Digest,
    ) -> Self {
        Self {
            meta: ContainerMeta {
                version: version.into(),
            },
            derive_info: DeriveInfo {
                salt: encode_hex(salt.as_bytes()),
                iterations,
            },
            encryption_info: EncryptionInfo {
                iv: encode_hex(iv.as_bytes()),
            },
            contained_data: ContainedData {
                encrypted_data: encode_hex(payload),
                digest: encode_hex(digest.as_bytes()),
            },
        }
    }

    /// Format metadata section.
    pub fn meta(&self) -> &ContainerMeta {
        &self.meta
    }

    /// Key derivation section.
    pub fn derive_info(&self) -> &DeriveInfo {
        &self.derive_info
    }

    /// Cipher parameter section.
    pub fn encryption_info(&self) -> &EncryptionInfo {
        &self.encryption_info
    }

    /// Payload and digest section.
    pub fn contained_data(&self) -> &ContainedData {
        &self.contained_data
    }

    /// Decode and validate every binary field.
    ///
    /// No cryptography runs here; this is the gate `open` passes before
    /// deriving a key.
    ///
    /// # Errors
    /// - `Error::Decode` if any field is not valid hex
    /// - `Error::MalformedRecord` if a field has the wrong length, the
    ///   payload is shorter than one block, or the iteration count is zero
    pub fn decode(&self) -> Result<DecodedRecord> {
        // Every field must be hex before any length is judged.
        let salt = decode_hex("Salt", &self.derive_info.salt)?;
        let iv = decode_hex("IV", &self.encryption_info.iv)?;
        let payload = decode_hex("EncryptedData", &self.contained_data.encrypted_data)?;
        let digest = decode_hex("HMAC", &self.contained_data.digest)?;

        let salt = into_array::<SALT_LENGTH>("Salt", salt)?;
        let iv = into_array::<IV_LENGTH>("IV", iv)?;
        let digest = into_array::<DIGEST_SIZE>("HMAC", digest)?;

        if self.derive_info.iterations == 0 {
            return Err(Error::MalformedRecord(
                "Iters: iteration count must be positive".to_string(),
            ));
        }
        if payload.len() < BLOCK_SIZE {
            return Err(Error::MalformedRecord(format!(
                "EncryptedData: expected at least {} bytes, got {}",
                BLOCK_SIZE,
                payload.len()
            )));
        }

        Ok(DecodedRecord {
            version: self.meta.version.clone(),
            salt: Salt::from_bytes(salt),
            iterations: self.derive_info.iterations,
            iv: Iv::from_bytes(iv),
            payload,
            digest: Digest::from_bytes(digest),
        })
    }

    /// Serialize the record to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serialize the record to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Parse a record from JSON.
    ///
    /// # Errors
    /// - `Error::MalformedRecord` on invalid JSON, missing sections or
    ///   fields of the wrong type
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::MalformedRecord(e.to_string()))
    }
}
