use aegis_kernel::error::AuditError;
use aegis_kernel::security::{AuditRecord, AuditSink};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A sink that rejects every record, counting the attempts.
#[derive(Debug, Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AuditSink for FailingSink {
    fn emit(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditError::Sink("collector unavailable".into()))
    }
}
