//! Audit sinks and record construction

use aegis_kernel::error::AuditError;
use aegis_kernel::security::{AUDIT_EVENT, AuditRecord, AuditSink, Finding};
use chrono::Utc;
use parking_lot::Mutex;
use tracing::info;
use uuid::Uuid;

/// Tracing target compliance records are written to.
pub const AUDIT_TARGET: &str = "aegis::audit";

/// Upper bound of [`risk_score`].
pub const MAX_RISK_SCORE: u32 = 100;

/// Sum of entity weights over applied findings, capped at [`MAX_RISK_SCORE`].
pub fn risk_score(applied: &[Finding]) -> u32 {
    applied
        .iter()
        .map(|f| f.entity_type.risk_weight())
        .fold(0u32, u32::saturating_add)
        .min(MAX_RISK_SCORE)
}

/// Metadata for one successful call. Lengths are in characters.
pub fn build_record(
    request_id: Uuid,
    actor_id: &str,
    original: &str,
    sanitized: &str,
    applied: &[Finding],
    registry_version: &str,
) -> AuditRecord {
    AuditRecord {
        request_id,
        event: AUDIT_EVENT.to_string(),
        actor_id: actor_id.to_string(),
        original_length: original.chars().count(),
        sanitized_length: sanitized.chars().count(),
        finding_count: applied.len(),
        pii_redacted: !applied.is_empty(),
        risk_score: risk_score(applied),
        registry_version: registry_version.to_string(),
        timestamp: Utc::now(),
    }
}

/// Writes each record as one JSON line on the [`AUDIT_TARGET`] target.
///
/// Route the target to a dedicated file or collector with an `EnvFilter`
/// directive such as `aegis::audit=info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let json = record.to_json()?;
        info!(target: AUDIT_TARGET, request_id = %record.request_id, record = %json, "{AUDIT_EVENT}");
        Ok(())
    }
}

/// Keeps records in memory. For tests and embedding applications that
/// forward records themselves.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn take(&self) -> Vec<AuditRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&self, record: &AuditRecord) -> Result<(), AuditError> {
        // serialization failures must surface here as they would on a real sink
        record.to_json()?;
        self.records.lock().push(record.clone());
        Ok(())
    }
}
