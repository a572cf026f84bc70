//! Detector implementations
//!
//! Concrete implementations of the kernel [`Recognizer`] contract.
//!
//! - **`builtin`**: context-scored English recognizers (SSN, email, phone, card)
//! - **`pattern`**: deterministic regex recognizers (API keys, custom rules)
//! - **`checksum`**: Luhn and SSN structural validation
//! - **`context`**: context-word confidence enhancement
//!
//! The registry stores detectors as the closed [`Detector`] variant set.

pub mod builtin;
pub mod checksum;
pub mod context;
pub mod pattern;

pub use builtin::{BuiltinRecognizer, LANGUAGE};
pub use context::ContextWords;
pub use pattern::{API_KEY_RECOGNIZER, Pattern, PatternRecognizer};

use aegis_kernel::error::DetectionError;
use aegis_kernel::security::{EntityType, Finding, Recognizer};
use std::fmt;

/// Every kind of detector the registry can hold.
pub enum Detector {
    /// Shipped context-scored recognizer
    Builtin(BuiltinRecognizer),
    /// Regex recognizer (vendor keys or configured rules)
    Pattern(PatternRecognizer),
    /// Any other [`Recognizer`] supplied by the embedding application
    Custom(Box<dyn Recognizer>),
}

impl Detector {
    /// Wraps an application-supplied recognizer.
    pub fn custom(recognizer: impl Recognizer + 'static) -> Self {
        Self::Custom(Box::new(recognizer))
    }

    fn as_recognizer(&self) -> &dyn Recognizer {
        match self {
            Self::Builtin(r) => r,
            Self::Pattern(r) => r,
            Self::Custom(r) => r.as_ref(),
        }
    }

    /// Variant tag, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Builtin(_) => "builtin",
            Self::Pattern(_) => "pattern",
            Self::Custom(_) => "custom",
        }
    }
}

impl Recognizer for Detector {
    fn name(&self) -> &str {
        self.as_recognizer().name()
    }

    fn supported_entities(&self) -> &[EntityType] {
        self.as_recognizer().supported_entities()
    }

    fn analyze(&self, text: &str) -> Result<Vec<Finding>, DetectionError> {
        self.as_recognizer().analyze(text)
    }
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .field("entities", &self.supported_entities())
            .finish()
    }
}

impl From<BuiltinRecognizer> for Detector {
    fn from(r: BuiltinRecognizer) -> Self {
        Self::Builtin(r)
    }
}

impl From<PatternRecognizer> for Detector {
    fn from(r: PatternRecognizer) -> Self {
        Self::Pattern(r)
    }
}

impl From<Box<dyn Recognizer>> for Detector {
    fn from(r: Box<dyn Recognizer>) -> Self {
        Self::Custom(r)
    }
}
