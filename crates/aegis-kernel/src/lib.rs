//! Aegis Kernel
//!
//! Contracts and data model for the Aegis prompt-sanitization gateway.
//!
//! The kernel owns *what* the gateway talks about: entity types, findings,
//! redaction policies, audit records, pipeline stages and the error taxonomy.
//! It also owns the multi-format configuration loader. Concrete recognizers,
//! the scanner, the redactor, the audit cipher and the gateway itself live in
//! `aegis-foundation`.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  aegis-kernel                    │
//! │  EntityType  Finding  RedactionPolicy            │
//! │  Recognizer trait     AuditSink trait            │
//! │  GatewaySettings      error taxonomy             │
//! └────────────────────────┬─────────────────────────┘
//!                          │ traits
//! ┌────────────────────────▼─────────────────────────┐
//! │                aegis-foundation                  │
//! │  Registry  Scanner  Redactor  AuditCipher        │
//! │  Gateway   GatewayCell                           │
//! └──────────────────────────────────────────────────┘
//! ```

// configuration loading and gateway settings
pub mod config;

// error taxonomy
pub mod error;

// per-call pipeline state machine
pub mod pipeline;

// entity types, findings, policies, audit records
pub mod security;

pub use config::GatewaySettings;
pub use error::{
    AuditError, ConfigurationError, DecryptionError, DetectionError, EncryptionError,
    GatewayError, RedactionError, RegistryError,
};
pub use pipeline::PipelineStage;
pub use security::{
    AuditRecord, AuditSink, EntitySet, EntityType, Finding, RedactionPolicy, RedactionStrategy,
    Recognizer,
};
