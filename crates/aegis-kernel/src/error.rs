//! Error taxonomy for the Aegis gateway.
//!
//! Construction-time problems are [`ConfigurationError`] and are fatal: the
//! process must not start serving. Per-call problems surface to the caller as
//! [`GatewayError`], which wraps the stage-specific errors and reports the
//! [`PipelineStage`] the call died in. [`DetectionError`] never reaches the
//! caller; the scanner recovers from it by dropping that detector's
//! contribution.

use crate::config::ConfigError;
use crate::pipeline::PipelineStage;
use crate::security::EntityType;
use thiserror::Error;

/// Result alias for gateway calls.
pub type AegisResult<T> = Result<T, GatewayError>;

// =============================================================================
// Construction
// =============================================================================

/// Invalid or missing configuration detected while building the gateway.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The environment variable holding the audit key is not set.
    #[error("encryption key variable '{0}' is not set")]
    MissingKey(String),

    /// The audit key is not valid URL-safe base64.
    #[error("encryption key is not valid url-safe base64: {0}")]
    InvalidKeyEncoding(String),

    /// The audit key decodes to the wrong number of bytes.
    #[error("encryption key must decode to {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes
        expected: usize,
        /// Decoded key length in bytes
        actual: usize,
    },

    /// Only English detectors are shipped.
    #[error("unsupported detector language '{0}' (only 'en' is available)")]
    UnsupportedLanguage(String),

    /// A confidence value lies outside `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    InvalidConfidence {
        /// Offending setting
        field: String,
        /// Offending value
        value: f64,
    },

    /// A timeout was configured as zero.
    #[error("{0} must be greater than 0 ms")]
    InvalidTimeout(&'static str),

    /// The recognized-entity list is empty.
    #[error("at least one entity type must be recognized")]
    NoEntities,

    /// A custom pattern rule is malformed.
    #[error("pattern rule '{name}' is invalid: {reason}")]
    InvalidPattern {
        /// Rule name
        name: String,
        /// Human-readable reason
        reason: String,
    },

    /// A recognized entity type has no redaction rule.
    #[error("no redaction rule for recognized entity {0}")]
    PolicyMissing(EntityType),

    /// The detector registry rejected a registration.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Loading the settings file failed.
    #[error("config error: {0}")]
    Load(#[from] ConfigError),
}

/// Rejection from `RegistryBuilder::register`.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// The detector declares an entity type outside the recognized set.
    #[error("detector '{detector}' declares {entity}, which is not a recognized entity")]
    UnrecognizedEntity {
        /// Detector name
        detector: String,
        /// Entity type outside the recognized set
        entity: EntityType,
    },

    /// A detector with this name is already registered.
    #[error("detector '{0}' is already registered")]
    DuplicateDetector(String),

    /// The detector declares no entity types at all.
    #[error("detector '{0}' declares no entity types")]
    NoEntities(String),
}

// =============================================================================
// Per-call
// =============================================================================

/// A single detector failed. Recovered locally by the scanner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DetectionError {
    /// The detector returned an error.
    #[error("detector '{detector}' failed: {reason}")]
    Failed {
        /// Detector name
        detector: String,
        /// Human-readable reason
        reason: String,
    },

    /// The detector panicked.
    #[error("detector '{detector}' panicked: {message}")]
    Panicked {
        /// Detector name
        detector: String,
        /// Panic payload, if it was a string
        message: String,
    },

    /// The detector ran past its time budget.
    #[error("detector '{detector}' took {elapsed_ms} ms (budget {budget_ms} ms)")]
    TimedOut {
        /// Detector name
        detector: String,
        /// Observed run time
        elapsed_ms: u64,
        /// Configured budget
        budget_ms: u64,
    },
}

/// Redaction refused to produce output.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RedactionError {
    /// A finding's entity type has no substitution rule.
    #[error("no redaction rule for entity {0}")]
    PolicyMissing(EntityType),

    /// A finding's span does not fit the text.
    #[error("finding span {start}..{end} is invalid for text of {len} bytes")]
    InvalidSpan {
        /// Span start
        start: usize,
        /// Span end (exclusive)
        end: usize,
        /// Text length in bytes
        len: usize,
    },
}

/// Sealing the original text failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncryptionError {
    /// The AEAD primitive reported an error.
    #[error("cipher failure: {0}")]
    Cipher(String),
}

/// Opening an audit envelope failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecryptionError {
    /// The blob is not a structurally valid envelope.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// The envelope version byte is unknown.
    #[error("unsupported envelope version 0x{0:02x}")]
    UnsupportedVersion(u8),

    /// Tag verification failed: wrong key or tampered envelope.
    #[error("envelope authentication failed")]
    Authentication,

    /// The envelope is older than the caller's TTL.
    #[error("envelope expired: issued {age_secs}s ago, ttl {ttl_secs}s")]
    Expired {
        /// Envelope age
        age_secs: u64,
        /// Caller's TTL
        ttl_secs: u64,
    },

    /// The envelope timestamp lies too far in the future.
    #[error("envelope issued in the future")]
    NotYetValid,

    /// The decrypted payload is not UTF-8.
    #[error("decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Emitting the audit record failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuditError {
    /// The record could not be serialized.
    #[error("audit record serialization failed: {0}")]
    Serialization(String),

    /// The sink refused the record.
    #[error("audit sink rejected record: {0}")]
    Sink(String),
}

/// Caller-facing failure of a gateway call.
///
/// A `GatewayError` always means *no output*: neither the sanitized text nor
/// the ciphertext blob is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The gateway is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Sealing the original text failed.
    #[error("encryption failed: {0}")]
    Encryption(#[from] EncryptionError),

    /// The whole scan ran past its time budget.
    #[error("scan took {elapsed_ms} ms (budget {budget_ms} ms)")]
    ScanTimeout {
        /// Observed scan time
        elapsed_ms: u64,
        /// Configured budget
        budget_ms: u64,
    },

    /// Redaction refused to produce output.
    #[error("redaction failed: {0}")]
    Redaction(#[from] RedactionError),

    /// The audit record could not be emitted.
    #[error("audit emission failed: {0}")]
    Audit(#[from] AuditError),

    /// A stage panicked.
    #[error("internal failure during {stage}: {message}")]
    Internal {
        /// Stage that panicked
        stage: PipelineStage,
        /// Panic payload, if it was a string
        message: String,
    },
}

impl GatewayError {
    /// The pipeline stage the call failed in.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Configuration(_) => PipelineStage::Received,
            Self::Encryption(_) => PipelineStage::Encrypting,
            Self::ScanTimeout { .. } => PipelineStage::Scanning,
            Self::Redaction(_) => PipelineStage::Redacting,
            Self::Audit(_) => PipelineStage::Logging,
            Self::Internal { stage, .. } => *stage,
        }
    }
}
