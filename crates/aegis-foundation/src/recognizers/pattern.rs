//! Deterministic pattern recognizers
//!
//! For entity types with a rigid lexical shape, chiefly vendor API keys
//! (`prefix` + random suffix). Each recognizer holds one or more named
//! [`Pattern`]s with a fixed confidence.

use super::context::ContextWords;
use aegis_kernel::config::PatternRuleConfig;
use aegis_kernel::error::{ConfigurationError, DetectionError};
use aegis_kernel::security::{EntityType, Finding, Recognizer};
use once_cell::sync::Lazy;
use regex::Regex;

/// Name of the default API key recognizer.
pub const API_KEY_RECOGNIZER: &str = "api_key_patterns";

/// A named regular expression with a fixed confidence.
#[derive(Debug, Clone)]
pub struct Pattern {
    name: String,
    regex: Regex,
    confidence: f64,
}

impl Pattern {
    pub fn new(
        name: impl Into<String>,
        regex: &str,
        confidence: f64,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ConfigurationError::InvalidConfidence {
                field: format!("patterns.{name}.confidence"),
                value: confidence,
            });
        }
        let regex = Regex::new(regex).map_err(|e| ConfigurationError::InvalidPattern {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name,
            regex,
            confidence,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

// Vendor key grammars: (name, regex, confidence)
const API_KEY_GRAMMARS: &[(&str, &str, f64)] = &[
    ("anthropic", r"\bsk-ant-[A-Za-z0-9_-]{20,}", 0.95),
    ("openai", r"\bsk-(?:proj-)?[A-Za-z0-9][A-Za-z0-9_-]{9,}", 0.9),
    ("github", r"\bgh[pousr]_[A-Za-z0-9]{20,}\b", 0.95),
    ("aws_access_key", r"\b(?:AKIA|ASIA)[A-Z0-9]{16}\b", 0.95),
    ("slack", r"\bxox[abprs]-[A-Za-z0-9-]{10,}", 0.95),
    ("stripe", r"\b(?:sk|rk)_live_[A-Za-z0-9]{16,}\b", 0.95),
    ("google", r"\bAIza[0-9A-Za-z_-]{35}", 0.9),
];

static API_KEY_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    API_KEY_GRAMMARS
        .iter()
        .map(|(name, re, confidence)| Pattern {
            name: (*name).to_string(),
            regex: Regex::new(re).unwrap(),
            confidence: *confidence,
        })
        .collect()
});

/// Regex recognizer for a single entity type.
///
/// # Example
///
/// ```rust,ignore
/// let recognizer = PatternRecognizer::new("internal_token", EntityType::ApiKey)
///     .with_pattern(Pattern::new("itk", r"\bitk_[A-Za-z0-9]{24}\b", 0.9)?);
/// ```
#[derive(Debug, Clone)]
pub struct PatternRecognizer {
    name: String,
    entity: [EntityType; 1],
    patterns: Vec<Pattern>,
    context: ContextWords,
}

impl PatternRecognizer {
    pub fn new(name: impl Into<String>, entity: EntityType) -> Self {
        Self {
            name: name.into(),
            entity: [entity],
            patterns: Vec::new(),
            context: ContextWords::none(),
        }
    }

    /// Vendor API key and token grammars.
    pub fn api_keys() -> Self {
        Self {
            name: API_KEY_RECOGNIZER.to_string(),
            entity: [EntityType::ApiKey],
            patterns: API_KEY_PATTERNS.clone(),
            context: ContextWords::none(),
        }
    }

    /// Builds a single-pattern recognizer from a configured rule.
    ///
    /// Context words, when present, add 0.15 to the rule's confidence.
    pub fn from_rule(rule: &PatternRuleConfig) -> Result<Self, ConfigurationError> {
        rule.validate()?;
        let pattern = Pattern::new(rule.name.clone(), &rule.regex, rule.confidence)?;
        Ok(Self::new(rule.name.clone(), rule.entity)
            .with_pattern(pattern)
            .with_context(ContextWords::new(rule.context.iter().cloned(), 0.15)))
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ContextWords) -> Self {
        self.context = context;
        self
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn entity(&self) -> EntityType {
        self.entity[0]
    }
}

impl Recognizer for PatternRecognizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_entities(&self) -> &[EntityType] {
        &self.entity
    }

    fn analyze(&self, text: &str) -> Result<Vec<Finding>, DetectionError> {
        let mut findings = Vec::new();

        for pattern in &self.patterns {
            for m in pattern.regex.find_iter(text) {
                if m.start() == m.end() {
                    continue;
                }
                let confidence = self.context.score(text, m.start(), pattern.confidence);
                findings.push(Finding::new(self.entity(), m.start(), m.end(), confidence));
            }
        }

        findings.sort_by_key(Finding::key);
        Ok(findings)
    }
}
