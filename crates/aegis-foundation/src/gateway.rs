//! Gateway
//!
//! Orchestrates the pipeline behind one synchronous call:
//!
//! ```text
//! text ──► AuditCipher ──► ciphertext_blob                (stays inside)
//!   └────► Scanner ──► findings ──► Redactor ──► sanitized (leaves)
//!                                        └──► AuditRecord ──► AuditSink
//! ```
//!
//! Either both outputs are returned or the call fails with a
//! [`GatewayError`]; no partial result ever leaves [`Gateway::process`].
//! The registry and key are built once in [`GatewayBuilder::build`] and then
//! only read, so one `Gateway` serves concurrent callers without locking.

use crate::audit::{TracingAuditSink, build_record};
use crate::crypto::{AuditCipher, SecretKey};
use crate::recognizers::{Detector, LANGUAGE};
use crate::registry::RegistryBuilder;
use crate::scanner::{Scanner, panic_message};
use crate::redactor::Redactor;
use aegis_kernel::config::GatewaySettings;
use aegis_kernel::error::{AegisResult, ConfigurationError, GatewayError};
use aegis_kernel::pipeline::PipelineStage;
use aegis_kernel::security::{AuditSink, EntitySet, Finding, RedactionPolicy};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, info_span};
use uuid::Uuid;

// =============================================================================
// Output
// =============================================================================

/// Successful result of [`Gateway::process`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GatewayOutput {
    /// Input with every finding substituted; safe to forward
    pub sanitized_text: String,
    /// Authenticated envelope of the original input; keep inside the trust boundary
    pub ciphertext_blob: String,
}

impl GatewayOutput {
    /// The defined result for blank input: both strings empty.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sanitized_text.is_empty() && self.ciphertext_blob.is_empty()
    }

    pub fn into_parts(self) -> (String, String) {
        (self.sanitized_text, self.ciphertext_blob)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds a [`Gateway`]. All expensive work happens in [`build`](Self::build).
///
/// # Example
///
/// ```rust,ignore
/// let gateway = Gateway::builder(GatewaySettings::default())
///     .key(SecretKey::from_env("AEGIS_ENCRYPTION_KEY")?)
///     .build()?;
/// let (sanitized, blob) = gateway.process(prompt, "SEC-OPS-ALPHA")?.into_parts();
/// ```
pub struct GatewayBuilder {
    settings: GatewaySettings,
    key: Option<SecretKey>,
    sink: Option<Arc<dyn AuditSink>>,
    policy: Option<RedactionPolicy>,
    detectors: Vec<Detector>,
}

impl GatewayBuilder {
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            settings,
            key: None,
            sink: None,
            policy: None,
            detectors: Vec::new(),
        }
    }

    /// Uses `key` instead of reading `settings.key_env`.
    #[must_use]
    pub fn key(mut self, key: SecretKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Audit sink; defaults to [`TracingAuditSink`].
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replaces the policy derived from settings.
    #[must_use]
    pub fn policy(mut self, policy: RedactionPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Registers an extra detector after the configured ones.
    #[must_use]
    pub fn detector(mut self, detector: impl Into<Detector>) -> Self {
        self.detectors.push(detector.into());
        self
    }

    /// Validates settings, loads the key, builds the registry and checks
    /// that every recognized entity type has a redaction rule.
    pub fn build(self) -> Result<Gateway, ConfigurationError> {
        let settings = self.settings;
        settings.validate()?;

        let key = match self.key {
            Some(key) => key,
            None => SecretKey::from_env(&settings.key_env)?,
        };

        let mut registry = RegistryBuilder::from_settings(&settings)?;
        for detector in self.detectors {
            registry.register(detector)?;
        }
        let registry = registry.build();

        let policy = self
            .policy
            .unwrap_or_else(|| settings.redaction_policy());
        if let Some(entity) = policy.first_uncovered(&settings.recognized_entities) {
            return Err(ConfigurationError::PolicyMissing(entity));
        }

        let scanner = Scanner::new(registry)
            .with_min_confidence(settings.min_confidence)
            .with_detector_timeout(settings.detector_timeout())
            .with_scan_timeout(settings.scan_timeout());

        info!(
            language = LANGUAGE,
            entities = %settings.recognized_entities,
            detectors = scanner.registry().len(),
            registry_version = scanner.registry().version(),
            min_confidence = settings.min_confidence,
            "Gateway initialized"
        );

        Ok(Gateway {
            entities: settings.recognized_entities,
            scanner,
            redactor: Redactor::new(policy),
            cipher: AuditCipher::new(&key),
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingAuditSink)),
        })
    }
}

impl fmt::Debug for GatewayBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayBuilder")
            .field("settings", &self.settings)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("custom_sink", &self.sink.is_some())
            .field("policy", &self.policy)
            .field("detectors", &self.detectors)
            .finish()
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// The prompt-sanitization gateway.
pub struct Gateway {
    entities: EntitySet,
    scanner: Scanner,
    redactor: Redactor,
    cipher: AuditCipher,
    sink: Arc<dyn AuditSink>,
}

impl Gateway {
    pub fn builder(settings: GatewaySettings) -> GatewayBuilder {
        GatewayBuilder::new(settings)
    }

    /// Key from `settings.key_env`, records to [`TracingAuditSink`].
    pub fn from_env(settings: GatewaySettings) -> Result<Self, ConfigurationError> {
        GatewayBuilder::new(settings).build()
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn policy(&self) -> &RedactionPolicy {
        self.redactor.policy()
    }

    pub fn registry_version(&self) -> &str {
        self.scanner.registry().version()
    }

    /// Runs only the scanner. Useful for dry runs; nothing is encrypted or audited.
    pub fn scan(&self, text: &str) -> AegisResult<Vec<Finding>> {
        self.scanner.scan(text, &self.entities)
    }

    /// Sanitizes `text` and seals the original.
    ///
    /// Blank input returns [`GatewayOutput::empty`] without running any
    /// detector or emitting a record. Any failure, including a panic inside
    /// a stage, is logged at error level and returned as a [`GatewayError`].
    pub fn process(&self, text: &str, actor_id: &str) -> AegisResult<GatewayOutput> {
        let request_id = Uuid::new_v4();
        let span = info_span!("process", %request_id, actor_id = %actor_id);
        let _enter = span.enter();

        if text.trim().is_empty() {
            debug!("Blank input, nothing to process");
            return Ok(GatewayOutput::empty());
        }

        let mut stage = PipelineStage::Received;
        debug!(stage = %stage, bytes = text.len(), "Stage entered");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.run(text, actor_id, request_id, &mut stage)
        }));

        let result = match outcome {
            Ok(result) => result,
            Err(payload) => Err(GatewayError::Internal {
                stage,
                message: panic_message(payload.as_ref()),
            }),
        };

        if let Err(err) = &result {
            error!(
                stage = %PipelineStage::Failed,
                failed_at = %err.stage(),
                error = %err,
                "Gateway call failed"
            );
        }
        result
    }

    fn run(
        &self,
        text: &str,
        actor_id: &str,
        request_id: Uuid,
        stage: &mut PipelineStage,
    ) -> AegisResult<GatewayOutput> {
        advance(stage);
        let ciphertext_blob = self.cipher.encrypt(text)?;

        advance(stage);
        let findings = self.scanner.scan(text, &self.entities)?;
        for f in &findings {
            debug!(entity = %f.entity_type, start = f.start, end = f.end, confidence = f.confidence, "Finding");
        }

        advance(stage);
        let redaction = self.redactor.redact(text, &findings)?;

        advance(stage);
        let record = build_record(
            request_id,
            actor_id,
            text,
            &redaction.text,
            &redaction.applied,
            self.registry_version(),
        );
        self.sink.emit(&record)?;

        advance(stage);
        info!(
            finding_count = record.finding_count,
            risk_score = record.risk_score,
            "Prompt sanitized"
        );

        Ok(GatewayOutput {
            sanitized_text: redaction.text,
            ciphertext_blob,
        })
    }
}

fn advance(stage: &mut PipelineStage) {
    *stage = stage.next();
    debug!(stage = %stage, "Stage entered");
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("entities", &self.entities)
            .field("registry_version", &self.registry_version())
            .field("detectors", &self.scanner.registry().len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// GatewayCell
// =============================================================================

/// Holds one shared [`Gateway`], constructed at most once.
///
/// ```rust,ignore
/// static GATEWAY: GatewayCell = GatewayCell::new();
///
/// let gateway = GATEWAY.get_or_try_init(|| Gateway::from_env(settings))?;
/// ```
#[derive(Debug, Default)]
pub struct GatewayCell {
    cell: OnceCell<Arc<Gateway>>,
}

impl GatewayCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the gateway, running `init` only if none was built yet.
    ///
    /// A failed `init` leaves the cell empty so a later call may retry.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<Arc<Gateway>, ConfigurationError>
    where
        F: FnOnce() -> Result<Gateway, ConfigurationError>,
    {
        self.cell
            .get_or_try_init(|| init().map(Arc::new))
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<Gateway>> {
        self.cell.get().cloned()
    }
}

// =============================================================================
// Tests
// =============================================================================
