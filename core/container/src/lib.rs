//! Password-protected data containers.
//!
//! [`seal`] turns plaintext and a password into a [`ContainerRecord`]
//! holding everything needed to recover it: PBKDF2 salt and iteration
//! count, the AES-256-CTR IV, the encrypted payload and a SHA-256 digest
//! of the plaintext. [`open`] reverses the process and checks the digest.
//!
//! ```no_run
//! let json = sealbox_container::seal_to_json(b"hello world", b"password123")?;
//! let plaintext = sealbox_container::open_json(&json, b"password123")?;
//! assert_eq!(plaintext, b"hello world");
//! # Ok::<(), sealbox_container::Error>(())
//! ```

pub mod config;
pub mod container;
pub mod record;

pub use config::ContainerConfig;
pub use container::{Container, ContainerBuilder};
pub use record::{
    ContainedData, ContainerMeta, ContainerRecord, DecodedRecord, DeriveInfo, EncryptionInfo,
    CURRENT_VERSION,
};
pub use sealbox_common::{Error, Result};

/// Seal with the default engine.
pub fn seal(plaintext: &[u8], password: &[u8]) -> Result<ContainerRecord> {
    Container::new().seal(plaintext, password)
}

/// Open with the default engine.
pub fn open(record: &ContainerRecord, password: &[u8]) -> Result<Vec<u8>> {
    Container::new().open(record, password)
}

/// Seal with the default engine and serialize to JSON.
pub fn seal_to_json(plaintext: &[u8], password: &[u8]) -> Result<String> {
    Container::new().seal_to_json(plaintext, password)
}

/// Parse a JSON record and open it with the default engine.
pub fn open_json(json: &str, password: &[u8]) -> Result<Vec<u8>> {
    Container::new().open_json(json, password)
}
