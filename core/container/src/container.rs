//! Sealing and opening containers.

use std::fmt;

use tracing::{debug, warn};

use crate::config::ContainerConfig;
use crate::record::{ContainerRecord, CURRENT_VERSION};
use sealbox_common::{Result, SensitiveBytes};
use sealbox_crypto::{
    cipher, derive_key, Calibrator, Digest, IterationSource, Iv, OsRandom, RandomSource, Salt,
};

/// Engine that seals plaintext into records and opens them again.
///
/// Holds no per-call state; one engine can serve concurrent callers.
pub struct Container {
    version: String,
    random: Box<dyn RandomSource>,
    iterations: Box<dyn IterationSource>,
}

impl Container {
    /// Engine with the OS random source and default calibration.
    pub fn new() -> Self {
        Self::from_config(&ContainerConfig::default())
    }

    /// Engine built from a configuration, using the OS random source.
    pub fn from_config(config: &ContainerConfig) -> Self {
        Self::builder()
            .version(config.version.clone())
            .iteration_source(Calibrator::new(config.calibration.clone()))
            .build()
    }

    /// Start building an engine with custom providers.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// Version tag written into sealed records.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Encrypt `plaintext` under `password` into a new record.
    ///
    /// # Postconditions
    /// - Salt and IV are freshly drawn for this call
    /// - The record holds the SHA-256 digest of `plaintext`
    ///
    /// # Errors
    /// - `Error::Randomness` if salt or IV generation fails
    /// - `Error::CipherInit` if the cipher rejects the derived key
    ///
    /// # Security
    /// - Neither password nor plaintext is logged
    pub fn seal(&self, plaintext: &[u8], password: &[u8]) -> Result<ContainerRecord> {
        let salt = Salt::generate(self.random.as_ref())?;
        let iterations = self.iterations.iterations();
        let key = derive_key(password, &salt, iterations)?;

        let iv = Iv::generate(self.random.as_ref())?;
        let payload = cipher::encrypt(key.as_bytes(), iv.as_bytes(), plaintext)?;
        let digest = Digest::compute(plaintext);

        debug!(
            iterations,
            plaintext_len = plaintext.len(),
            "Sealed container"
        );

        Ok(ContainerRecord::assemble(
            self.version.as_str(),
            &salt,
            iterations,
            &iv,
            &payload,
            &digest,
        ))
    }

    /// Seal and serialize to compact JSON.
    pub fn seal_to_json(&self, plaintext: &[u8], password: &[u8]) -> Result<String> {
        self.seal(plaintext, password)?.to_json()
    }

    /// Decrypt a record and verify its integrity tag.
    ///
    /// # Errors
    /// - `Error::Decode` / `Error::MalformedRecord` if the record does not
    ///   validate; no key is derived in that case
    /// - `Error::IntegrityMismatch` on a wrong password or tampered record
    ///
    /// # Security
    /// - Decrypted bytes that fail verification are zeroized, never returned
    pub fn open(&self, record: &ContainerRecord, password: &[u8]) -> Result<Vec<u8>> {
        let decoded = record.decode()?;
        if decoded.version != CURRENT_VERSION {
            warn!(version = %decoded.version, "Opening container with unrecognised version tag");
        }

        let key = derive_key(password, &decoded.salt, decoded.iterations)?;
        let plaintext = SensitiveBytes::new(cipher::decrypt(
            key.as_bytes(),
            decoded.iv.as_bytes(),
            &decoded.payload,
        )?);

        if let Err(e) = decoded.digest.verify(plaintext.as_bytes()) {
            warn!("Container integrity check failed");
            return Err(e);
        }

        debug!(
            iterations = decoded.iterations,
            plaintext_len = plaintext.len(),
            "Opened container"
        );
        Ok(plaintext.into_inner())
    }

    /// Parse a JSON record and open it.
    pub fn open_json(&self, json: &str, password: &[u8]) -> Result<Vec<u8>> {
        let record = ContainerRecord::from_json(json)?;
        self.open(&record, password)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Container`].
pub struct ContainerBuilder {
    version: String,
    random: Box<dyn RandomSource>,
    iterations: Box<dyn IterationSource>,
}

impl ContainerBuilder {
    /// Set the version tag written into records.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Replace the salt/IV random source.
    pub fn random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    /// Replace the iteration-count source.
    pub fn iteration_source(mut self, iterations: impl IterationSource + 'static) -> Self {
        self.iterations = Box::new(iterations);
        self
    }

    /// Finish building the engine.
    pub fn build(self) -> Container {
        Container {
            version: self.version,
            random: self.random,
            iterations: self.iterations,
        }
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            random: Box::new(OsRandom),
            iterations: Box::new(Calibrator::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sealbox_common::{decode_hex, encode_hex, Error};
    use sealbox_crypto::{FixedIterations, BLOCK_SIZE, MIN_ITERATIONS};
    use std::sync::atomic::{AtomicU8, Ordering};

    /// Deterministic source: each fill continues a byte counter.
    struct CountingRandom(AtomicU8);

    impl CountingRandom {
        fn new() -> Self {
            Self(AtomicU8::new(0))
        }
    }

    impl RandomSource for CountingRandom {
        fn fill(&self, buf: &mut [u8]) -> Result<()> {
            for b in buf.iter_mut() {
                *b = self.0.fetch_add(1, Ordering::Relaxed);
            }
            Ok(())
        }
    }

    struct FailingRandom;

    impl RandomSource for FailingRandom {
        fn fill(&self, _buf: &mut [u8]) -> Result<()> {
            Err(Error::Randomness("entropy source unavailable".to_string()))
        }
    }

    fn fast() -> Container {
        Container::builder()
            .iteration_source(FixedIterations::new(MIN_ITERATIONS))
            .build()
    }

    fn tamper(record: &ContainerRecord, field: &str, byte: usize) -> ContainerRecord {
        let mut json: serde_json::Value = serde_json::to_value(record).unwrap();
        let mut bytes = decode_hex(field, json["ContainedData"][field].as_str().unwrap()).unwrap();
        bytes[byte] ^= 0x01;
        json["ContainedData"][field] = encode_hex(&bytes).into();
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_hello_world_scenario() {
        let engine = Container::from_config(&ContainerConfig::bounded(20_000));
        let record = engine.seal(b"hello world", b"password123").unwrap();

        assert_eq!(record.meta().version(), "v1.0");
        assert_eq!(record.derive_info().salt().len(), 24);
        assert_eq!(record.encryption_info().iv().len(), 32);
        assert_eq!(record.contained_data().digest().len(), 64);
        assert!(record.derive_info().iterations() >= MIN_ITERATIONS);

        assert_eq!(engine.open(&record, b"password123").unwrap(), b"hello world");

        let err = engine.open(&record, b"wrongpass").unwrap_err();
        assert!(matches!(err, Error::IntegrityMismatch));
        assert_eq!(err.to_string(), "HMAC mismatch");
    }

    #[test]
    fn test_json_roundtrip() {
        let engine = fast();
        let json = engine.seal_to_json(b"sensitive information", b"strongpassword").unwrap();
        let plaintext = engine.open_json(&json, b"strongpassword").unwrap();
        assert_eq!(plaintext, b"sensitive information");
    }

    #[test]
    fn test_wrong_password_fails() {
        let engine = fast();
        let record = engine.seal(b"hello world", b"correctpassword").unwrap();

        let result = engine.open(&record, b"wrongpassword");
        assert!(matches!(result, Err(Error::IntegrityMismatch)));
    }

    #[test]
    fn test_tampered_ciphertext_detected() {
        let engine = fast();
        let plaintext = b"tamper";
        let record = engine.seal(plaintext, b"pw").unwrap();

        for byte in BLOCK_SIZE..BLOCK_SIZE + plaintext.len() {
            let tampered = tamper(&record, "EncryptedData", byte);
            assert!(
                matches!(engine.open(&tampered, b"pw"), Err(Error::IntegrityMismatch)),
                "flip at byte {} not detected",
                byte
            );
        }
    }

    #[test]
    fn test_tampered_digest_detected() {
        let engine = fast();
        let record = engine.seal(b"tamper", b"pw").unwrap();

        for byte in [0, 15, 31] {
            let tampered = tamper(&record, "HMAC", byte);
            assert!(matches!(
                engine.open(&tampered, b"pw"),
                Err(Error::IntegrityMismatch)
            ));
        }
    }

    #[test]
    fn test_seal_is_randomized() {
        let engine = fast();
        let a = engine.seal_to_json(b"same text", b"samepassword").unwrap();
        let b = engine.seal_to_json(b"same text", b"samepassword").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_injected_randomness_is_reproducible() {
        let seal = || {
            Container::builder()
                .random_source(CountingRandom::new())
                .iteration_source(FixedIterations::new(5000))
                .build()
                .seal(b"deterministic", b"pw")
                .unwrap()
        };

        let a = seal();
        let b = seal();
        assert_eq!(a, b);
        assert_eq!(a.derive_info().salt(), "000102030405060708090a0b");
        assert_eq!(a.encryption_info().iv(), "0c0d0e0f101112131415161718191a1b");
        assert_eq!(a.derive_info().iterations(), 5000);
        assert!(a
            .contained_data()
            .encrypted_data()
            .starts_with(&"00".repeat(BLOCK_SIZE)));
    }

    #[test]
    fn test_randomness_failure_propagates() {
        let engine = Container::builder()
            .random_source(FailingRandom)
            .iteration_source(FixedIterations::new(MIN_ITERATIONS))
            .build();

        assert!(matches!(
            engine.seal(b"data", b"pw"),
            Err(Error::Randomness(_))
        ));
    }

    #[test]
    fn test_non_hex_field_is_decode_error() {
        let engine = fast();
        let mut json: serde_json::Value =
            serde_json::to_value(engine.seal(b"data", b"pw").unwrap()).unwrap();
        json["EncryptionInfo"]["IV"] = "not-hex-at-all".into();

        let result = engine.open_json(&json.to_string(), b"pw");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let engine = fast();
        assert!(matches!(
            engine.open_json(r#"{"ContainerMeta":{}}"#, b"pw"),
            Err(Error::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_empty_plaintext_and_password() {
        let engine = fast();
        let record = engine.seal(b"", b"").unwrap();

        assert_eq!(
            record.contained_data().encrypted_data(),
            "00".repeat(BLOCK_SIZE)
        );
        assert!(engine.open(&record, b"").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_version_still_opens() {
        let engine = Container::builder()
            .version("v9.9")
            .iteration_source(FixedIterations::new(MIN_ITERATIONS))
            .build();
        let record = engine.seal(b"data", b"pw").unwrap();

        assert_eq!(record.meta().version(), "v9.9");
        assert_eq!(fast().open(&record, b"pw").unwrap(), b"data");
    }

    #[test]
    fn test_concurrent_use() {
        let engine = fast();
        std::thread::scope(|s| {
            for i in 0..4u8 {
                let engine = &engine;
                s.spawn(move || {
                    let plaintext = vec![i; 100];
                    let record = engine.seal(&plaintext, &[i]).unwrap();
                    assert_eq!(engine.open(&record, &[i]).unwrap(), plaintext);
                });
            }
        });
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_seal_open_roundtrip(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            password in proptest::collection::vec(any::<u8>(), 0..32),
        ) {
            let engine = fast();
            let record = engine.seal(&plaintext, &password).unwrap();
            prop_assert_eq!(engine.open(&record, &password).unwrap(), plaintext);
        }
    }
}
