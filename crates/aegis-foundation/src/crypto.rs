//! Audit encipherer
//!
//! Seals the untouched original text into a self-describing authenticated
//! envelope, URL-safe base64 encoded:
//!
//! ```text
//! +---------+----------------+-----------+------------------------------+
//! | version | issued_at (BE) | nonce     | AES-256-GCM ciphertext + tag |
//! | 1 byte  | 8 bytes        | 12 bytes  | n + 16 bytes                 |
//! +---------+----------------+-----------+------------------------------+
//! ```
//!
//! Version byte and timestamp are bound as associated data, so neither can
//! be altered without failing authentication. Every envelope gets a fresh
//! random nonce.

use aegis_kernel::error::{ConfigurationError, DecryptionError, EncryptionError};
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use std::time::Duration;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// Envelope format version.
pub const ENVELOPE_VERSION: u8 = 0xA1;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + 8;
const MIN_ENVELOPE_LEN: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

/// Tolerated clock skew for envelopes stamped slightly in the future.
const MAX_CLOCK_SKEW_SECS: u64 = 60;

// =============================================================================
// SecretKey
// =============================================================================

/// 256-bit audit key. Never printed: `Debug` shows a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// A fresh random key from the OS generator.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parses URL-safe base64, padded or not.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigurationError> {
        let encoded = encoded.trim();
        let bytes = URL_SAFE
            .decode(encoded)
            .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
            .map_err(|e| ConfigurationError::InvalidKeyEncoding(e.to_string()))?;

        let bytes: [u8; KEY_LEN] =
            bytes
                .try_into()
                .map_err(|b: Vec<u8>| ConfigurationError::InvalidKeyLength {
                    expected: KEY_LEN,
                    actual: b.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Reads and parses the key from environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self, ConfigurationError> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Self::from_base64(&value),
            _ => Err(ConfigurationError::MissingKey(var.to_string())),
        }
    }

    /// URL-safe base64 with padding (44 characters).
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(self.0)
    }

    fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl From<[u8; KEY_LEN]> for SecretKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

// =============================================================================
// AuditCipher
// =============================================================================

/// Encrypts and decrypts audit envelopes with one [`SecretKey`].
#[derive(Clone)]
pub struct AuditCipher {
    cipher: Aes256Gcm,
}

impl AuditCipher {
    pub fn new(key: &SecretKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Seals `plaintext` into a new envelope stamped with the current time.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        self.encrypt_at(plaintext, now_secs())
    }

    fn encrypt_at(&self, plaintext: &str, issued_at: u64) -> Result<String, EncryptionError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let header = header(issued_at);
        let sealed = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: &header,
                },
            )
            .map_err(|e| EncryptionError::Cipher(e.to_string()))?;

        let mut envelope = Vec::with_capacity(HEADER_LEN + NONCE_LEN + sealed.len());
        envelope.extend_from_slice(&header);
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&sealed);
        Ok(URL_SAFE.encode(envelope))
    }

    /// Opens an envelope regardless of its age.
    pub fn decrypt(&self, blob: &str) -> Result<String, DecryptionError> {
        self.open(blob).map(|(plaintext, _)| plaintext)
    }

    /// Opens an envelope, rejecting it when older than `ttl` or stamped
    /// further in the future than the tolerated clock skew.
    pub fn decrypt_with_ttl(&self, blob: &str, ttl: Duration) -> Result<String, DecryptionError> {
        self.decrypt_with_ttl_at(blob, ttl, now_secs())
    }

    fn decrypt_with_ttl_at(
        &self,
        blob: &str,
        ttl: Duration,
        now: u64,
    ) -> Result<String, DecryptionError> {
        let (plaintext, issued_at) = self.open(blob)?;

        if issued_at > now.saturating_add(MAX_CLOCK_SKEW_SECS) {
            return Err(DecryptionError::NotYetValid);
        }
        let age_secs = now.saturating_sub(issued_at);
        if age_secs > ttl.as_secs() {
            return Err(DecryptionError::Expired {
                age_secs,
                ttl_secs: ttl.as_secs(),
            });
        }
        Ok(plaintext)
    }

    fn open(&self, blob: &str) -> Result<(String, u64), DecryptionError> {
        let envelope = URL_SAFE
            .decode(blob.trim())
            .map_err(|e| DecryptionError::Malformed(e.to_string()))?;

        if envelope.len() < MIN_ENVELOPE_LEN {
            return Err(DecryptionError::Malformed(format!(
                "envelope is {} bytes, minimum is {MIN_ENVELOPE_LEN}",
                envelope.len()
            )));
        }

        let (header, rest) = envelope.split_at(HEADER_LEN);
        if header[0] != ENVELOPE_VERSION {
            return Err(DecryptionError::UnsupportedVersion(header[0]));
        }
        let mut stamp = [0u8; 8];
        stamp.copy_from_slice(&header[1..]);
        let issued_at = u64::from_be_bytes(stamp);

        let (nonce, sealed) = rest.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: header,
                },
            )
            .map_err(|_| DecryptionError::Authentication)?;

        let plaintext = String::from_utf8(plaintext).map_err(|_| DecryptionError::InvalidUtf8)?;
        Ok((plaintext, issued_at))
    }
}

impl fmt::Debug for AuditCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditCipher")
            .field("version", &ENVELOPE_VERSION)
            .finish_non_exhaustive()
    }
}

fn header(issued_at: u64) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0] = ENVELOPE_VERSION;
    header[1..].copy_from_slice(&issued_at.to_be_bytes());
    header
}

fn now_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}
