//! Sensitive-data core types
//!
//! Defines the closed set of entity types the gateway recognizes, the located
//! and scored [`Finding`] produced by detectors, and the substitution
//! strategies the redactor can apply.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Entity types
// =============================================================================

/// Categories of sensitive data the gateway detects.
///
/// The set is closed and known at configuration time. Wire names are the
/// upper-case identifiers used in placeholders (`<EMAIL_ADDRESS>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// US Social Security Numbers
    Ssn,
    /// Email addresses
    EmailAddress,
    /// Phone numbers (NANP and `+`-prefixed international)
    PhoneNumber,
    /// Payment card numbers (Luhn-validated)
    CreditCard,
    /// Vendor API keys and access tokens
    ApiKey,
}

impl EntityType {
    /// Every entity type, in declaration order.
    pub const ALL: [EntityType; 5] = [
        EntityType::Ssn,
        EntityType::EmailAddress,
        EntityType::PhoneNumber,
        EntityType::CreditCard,
        EntityType::ApiKey,
    ];

    /// Upper-case wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ssn => "SSN",
            Self::EmailAddress => "EMAIL_ADDRESS",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::CreditCard => "CREDIT_CARD",
            Self::ApiKey => "API_KEY",
        }
    }

    /// Contribution of one applied finding of this type to the audit risk score.
    #[must_use]
    pub fn risk_weight(self) -> u32 {
        match self {
            Self::Ssn => 40,
            Self::EmailAddress => 10,
            Self::PhoneNumber => 15,
            Self::CreditCard => 40,
            Self::ApiKey => 50,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown entity type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type '{0}'")]
pub struct ParseEntityTypeError(pub String);

impl FromStr for EntityType {
    type Err = ParseEntityTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        EntityType::ALL
            .into_iter()
            .find(|e| e.as_str() == normalized)
            .ok_or_else(|| ParseEntityTypeError(s.to_string()))
    }
}

/// An ordered set of entity types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySet(BTreeSet<EntityType>);

impl EntitySet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entity type the gateway knows.
    #[must_use]
    pub fn all() -> Self {
        EntityType::ALL.into_iter().collect()
    }

    #[must_use]
    pub fn contains(&self, entity: EntityType) -> bool {
        self.0.contains(&entity)
    }

    /// Adds an entity type. Returns `false` if it was already present.
    pub fn insert(&mut self, entity: EntityType) -> bool {
        self.0.insert(entity)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<EntityType> for EntitySet {
    fn from_iter<I: IntoIterator<Item = EntityType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for EntitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(EntityType::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

// =============================================================================
// Findings
// =============================================================================

/// A located, typed, scored detection of sensitive data.
///
/// `start` and `end` are byte offsets into the original text, `end`
/// exclusive. Findings never carry the matched text itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Category of the detected data
    pub entity_type: EntityType,
    /// Byte offset of the span start
    pub start: usize,
    /// Byte offset of the span end (exclusive)
    pub end: usize,
    /// Detector confidence in `[0, 1]`
    pub confidence: f64,
}

impl Finding {
    /// Creates a finding. Confidence is clamped to `[0, 1]`; NaN becomes 0.
    #[must_use]
    pub fn new(entity_type: EntityType, start: usize, end: usize, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            entity_type,
            start,
            end,
            confidence,
        }
    }

    /// Span length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the two spans share at least one byte.
    #[must_use]
    pub fn overlaps(&self, other: &Finding) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns `true` if the span is non-empty, in bounds and on UTF-8
    /// character boundaries of `text`.
    #[must_use]
    pub fn fits(&self, text: &str) -> bool {
        self.start < self.end
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }

    /// Identity used for de-duplication.
    #[must_use]
    pub fn key(&self) -> (usize, usize, EntityType) {
        (self.start, self.end, self.entity_type)
    }
}

// =============================================================================
// Redaction strategies
// =============================================================================

/// How a finding's span is substituted in the sanitized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RedactionStrategy {
    /// Replace with a fixed placeholder; `<ENTITY_TYPE>` when unset.
    Replace {
        #[serde(default)]
        placeholder: Option<String>,
    },
    /// Remove the span entirely.
    Redact,
    /// Overwrite characters with `masking_char`.
    ///
    /// `chars_to_mask = None` masks the whole span; otherwise only that many
    /// characters, counted from the start or, with `from_end`, the end.
    Mask {
        #[serde(default = "default_masking_char")]
        masking_char: char,
        #[serde(default)]
        chars_to_mask: Option<usize>,
        #[serde(default)]
        from_end: bool,
    },
    /// Replace with `<ENTITY_TYPE:xxxxxxxx>`, a SHA-256 prefix of the span.
    Hash,
}

fn default_masking_char() -> char {
    '*'
}

impl Default for RedactionStrategy {
    fn default() -> Self {
        Self::Replace { placeholder: None }
    }
}

impl RedactionStrategy {
    /// Replace with a fixed placeholder string.
    #[must_use]
    pub fn replace(placeholder: impl Into<String>) -> Self {
        Self::Replace {
            placeholder: Some(placeholder.into()),
        }
    }

    /// Mask every character of the span with `*`.
    #[must_use]
    pub fn mask_all() -> Self {
        Self::Mask {
            masking_char: default_masking_char(),
            chars_to_mask: None,
            from_end: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
