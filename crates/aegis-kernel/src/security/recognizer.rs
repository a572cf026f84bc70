//! Detection contract
//!
//! Kernel-level capability shared by every detector: given text, return zero
//! or more [`Finding`]s for the entity types it declares.

use super::types::{EntityType, Finding};
use crate::error::DetectionError;

/// Scans text for sensitive spans of its declared entity types.
///
/// Implementations must be deterministic for identical input and safe for
/// concurrent read-only use; the registry that holds them is shared across
/// threads without locking.
///
/// # Example
///
/// ```rust,ignore
/// let recognizer = BuiltinRecognizer::email();
/// let findings = recognizer.analyze("mail me at test@example.com")?;
/// assert_eq!(findings[0].entity_type, EntityType::EmailAddress);
/// ```
pub trait Recognizer: Send + Sync {
    /// Stable, unique name (used in logs and the registry fingerprint).
    fn name(&self) -> &str;

    /// Entity types this recognizer may report.
    fn supported_entities(&self) -> &[EntityType];

    /// Returns every finding in `text`.
    fn analyze(&self, text: &str) -> Result<Vec<Finding>, DetectionError>;
}
