//! Gateway settings
//!
//! Everything the gateway needs at construction except the key itself, which
//! is read from the environment variable named by `key_env`.

use crate::error::ConfigurationError;
use crate::security::{EntitySet, EntityType, RedactionPolicy, RedactionStrategy};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable read for the audit key unless overridden.
pub const DEFAULT_KEY_ENV: &str = "AEGIS_ENCRYPTION_KEY";

/// Construction-time configuration of the gateway.
///
/// Every field has a default, so an empty settings file is valid and yields
/// a gateway recognizing all entity types with `<ENTITY_TYPE>` placeholders.
///
/// ```toml
/// recognized_entities = ["EMAIL_ADDRESS", "API_KEY"]
/// min_confidence = 0.3
/// scan_timeout_ms = 2000
///
/// [[redaction]]
/// entity = "EMAIL_ADDRESS"
/// strategy = "mask"
/// chars_to_mask = 4
///
/// [[patterns]]
/// name = "internal_token"
/// entity = "API_KEY"
/// regex = '\bitk_[A-Za-z0-9]{24}\b'
/// confidence = 0.9
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Detector language; only `en` ships
    pub language: String,
    /// Entity types the gateway scans for
    pub recognized_entities: EntitySet,
    /// Findings below this confidence are dropped by the scanner
    pub min_confidence: f64,
    /// Per-detector budget; a detector over budget contributes nothing
    pub detector_timeout_ms: Option<u64>,
    /// Whole-scan budget; a scan over budget fails the call
    pub scan_timeout_ms: Option<u64>,
    /// Environment variable holding the audit key
    pub key_env: String,
    /// Per-entity overrides on top of the default placeholder policy
    pub redaction: Vec<RedactionRuleConfig>,
    /// Custom pattern rules appended after the built-in detectors
    pub patterns: Vec<PatternRuleConfig>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            recognized_entities: EntitySet::all(),
            min_confidence: 0.0,
            detector_timeout_ms: None,
            scan_timeout_ms: None,
            key_env: DEFAULT_KEY_ENV.to_string(),
            redaction: Vec::new(),
            patterns: Vec::new(),
        }
    }
}

/// One entry of the `redaction` override list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRuleConfig {
    pub entity: EntityType,
    #[serde(flatten)]
    pub strategy: RedactionStrategy,
}

/// A custom deterministic pattern detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRuleConfig {
    /// Unique detector name
    pub name: String,
    /// Entity type reported for matches
    pub entity: EntityType,
    /// Regular expression (Rust `regex` syntax)
    pub regex: String,
    /// Confidence assigned to every match
    #[serde(default = "default_rule_confidence")]
    pub confidence: f64,
    /// Optional context words that raise confidence when found near a match
    #[serde(default)]
    pub context: Vec<String>,
}

fn default_rule_confidence() -> f64 {
    0.85
}

impl GatewaySettings {
    /// Restrict the recognized entity types.
    #[must_use]
    pub fn with_entities(mut self, entities: impl IntoIterator<Item = EntityType>) -> Self {
        self.recognized_entities = entities.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    #[must_use]
    pub fn with_redaction(mut self, entity: EntityType, strategy: RedactionStrategy) -> Self {
        self.redaction.push(RedactionRuleConfig { entity, strategy });
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, rule: PatternRuleConfig) -> Self {
        self.patterns.push(rule);
        self
    }

    #[must_use]
    pub fn with_key_env(mut self, key_env: impl Into<String>) -> Self {
        self.key_env = key_env.into();
        self
    }

    #[must_use]
    pub fn with_scan_timeout_ms(mut self, ms: u64) -> Self {
        self.scan_timeout_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_detector_timeout_ms(mut self, ms: u64) -> Self {
        self.detector_timeout_ms = Some(ms);
        self
    }

    pub fn detector_timeout(&self) -> Option<Duration> {
        self.detector_timeout_ms.map(Duration::from_millis)
    }

    pub fn scan_timeout(&self) -> Option<Duration> {
        self.scan_timeout_ms.map(Duration::from_millis)
    }

    /// Default placeholder policy with the `redaction` overrides applied in order.
    #[must_use]
    pub fn redaction_policy(&self) -> RedactionPolicy {
        self.redaction
            .iter()
            .fold(RedactionPolicy::default(), |policy, rule| {
                policy.with_rule(rule.entity, rule.strategy.clone())
            })
    }

    /// Checks every value that can be checked without building detectors.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.language.eq_ignore_ascii_case("en") {
            return Err(ConfigurationError::UnsupportedLanguage(self.language.clone()));
        }

        if self.recognized_entities.is_empty() {
            return Err(ConfigurationError::NoEntities);
        }

        check_confidence("min_confidence", self.min_confidence)?;

        if self.detector_timeout_ms == Some(0) {
            return Err(ConfigurationError::InvalidTimeout("detector_timeout_ms"));
        }
        if self.scan_timeout_ms == Some(0) {
            return Err(ConfigurationError::InvalidTimeout("scan_timeout_ms"));
        }

        if self.key_env.trim().is_empty() {
            return Err(ConfigurationError::MissingKey(self.key_env.clone()));
        }

        for rule in &self.patterns {
            rule.validate()?;
        }

        Ok(())
    }
}

impl PatternRuleConfig {
    pub fn new(name: impl Into<String>, entity: EntityType, regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity,
            regex: regex.into(),
            confidence: default_rule_confidence(),
            context: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_context(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.context = words.into_iter().map(Into::into).collect();
        self
    }

    /// Name, confidence and regex syntax.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::InvalidPattern {
                name: self.name.clone(),
                reason: "name cannot be empty".into(),
            });
        }
        check_confidence(&format!("patterns.{}.confidence", self.name), self.confidence)?;
        Regex::new(&self.regex).map_err(|e| ConfigurationError::InvalidPattern {
            name: self.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn check_confidence(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidConfidence {
            field: field.to_string(),
            value,
        })
    }
}
