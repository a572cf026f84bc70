//! Aegis Foundation
//!
//! Implementations behind the `aegis-kernel` contracts: the detector
//! registry, scanner, redactor, audit cipher, audit sinks and the gateway
//! that orchestrates them.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use aegis_foundation::{Gateway, GatewaySettings};
//!
//! // key read from AEGIS_ENCRYPTION_KEY, records go to the `aegis::audit` target
//! let gateway = Gateway::from_env(GatewaySettings::default())?;
//! let output = gateway.process("mail test@example.com", "SEC-OPS-ALPHA")?;
//! assert_eq!(output.sanitized_text, "mail <EMAIL_ADDRESS>");
//! ```

pub mod audit;
pub mod crypto;
pub mod gateway;
pub mod recognizers;
pub mod redactor;
pub mod registry;
pub mod scanner;

pub use audit::{AUDIT_TARGET, MemoryAuditSink, TracingAuditSink, risk_score};
pub use crypto::{AuditCipher, KEY_LEN, SecretKey};
pub use gateway::{Gateway, GatewayBuilder, GatewayCell, GatewayOutput};
pub use recognizers::{BuiltinRecognizer, Detector, Pattern, PatternRecognizer};
pub use redactor::{Redaction, Redactor, redact, resolve_overlaps};
pub use registry::{Registry, RegistryBuilder};
pub use scanner::{ScanReport, Scanner};

pub use aegis_kernel::{
    AuditRecord, AuditSink, EntitySet, EntityType, Finding, GatewayError, GatewaySettings,
    PipelineStage, Recognizer, RedactionPolicy, RedactionStrategy,
};
