//! Compliance audit record
//!
//! One [`AuditRecord`] is emitted per successful gateway call. The record is
//! derived metadata only: it never carries the original text, the sanitized
//! text, matched spans, key material or ciphertext, so the compliance log is
//! itself non-sensitive.

use crate::error::AuditError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event name stamped on every record.
pub const AUDIT_EVENT: &str = "AI_PROMPT_SANITIZED";

/// Metadata describing one sanitized prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Per-call correlation id
    pub request_id: Uuid,
    /// Always [`AUDIT_EVENT`]
    pub event: String,
    /// Operator or service that submitted the prompt
    pub actor_id: String,
    /// Length of the original text in characters
    pub original_length: usize,
    /// Length of the sanitized text in characters
    pub sanitized_length: usize,
    /// Number of findings applied by the redactor
    pub finding_count: usize,
    /// `true` when at least one span was redacted
    pub pii_redacted: bool,
    /// Weighted sum of applied findings, capped at 100
    pub risk_score: u32,
    /// Fingerprint of the detector registry that produced the findings
    pub registry_version: String,
    /// Emission time
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    /// Serializes the record as a single JSON line.
    pub fn to_json(&self) -> Result<String, AuditError> {
        serde_json::to_string(self).map_err(|e| AuditError::Serialization(e.to_string()))
    }
}

/// Receives audit records. The gateway emits, it never persists.
///
/// Emission is synchronous; a sink that fails makes the whole call fail so
/// that no output leaves the gateway without a matching record.
pub trait AuditSink: Send + Sync {
    /// Record one audit event.
    fn emit(&self, record: &AuditRecord) -> Result<(), AuditError>;
}
