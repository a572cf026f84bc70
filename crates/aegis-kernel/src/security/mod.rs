//! Sensitive-data contracts
//!
//! - **types**: entity types, entity sets, findings, redaction strategies
//! - **policy**: entity → substitution mapping
//! - **recognizer**: the "scan text, yield findings" capability
//! - **audit**: the metadata-only compliance record and its sink

pub mod audit;
pub mod policy;
pub mod recognizer;
pub mod types;

pub use audit::{AuditRecord, AuditSink, AUDIT_EVENT};
pub use policy::RedactionPolicy;
pub use recognizer::Recognizer;
pub use types::{EntitySet, EntityType, Finding, ParseEntityTypeError, RedactionStrategy};
