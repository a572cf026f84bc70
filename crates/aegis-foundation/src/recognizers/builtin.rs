//! Built-in English recognizers for SSN, email, phone and payment cards
//!
//! Each recognizer pairs compiled patterns with an optional structural
//! validator and a context-word boost. Scores are deterministic: the same
//! text always yields the same findings with the same confidences.
//!
//! A candidate rejected by its validator does not consume its span: the
//! search resumes one character after the candidate's start, so a valid
//! match overlapping it is still found.

use super::checksum::{e164_valid, luhn_valid, ssn_valid};
use super::context::ContextWords;
use aegis_kernel::error::DetectionError;
use aegis_kernel::security::{EntityType, Finding, Recognizer};
use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Compiled Regex Patterns
// =============================================================================

// SSN: xxx-xx-xxxx or xxx xx xxxx
static SSN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b|\b\d{3} \d{2} \d{4}\b").unwrap());

// Email: RFC 5322 simplified
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}\b").unwrap());

// Phone: NANP (555-123-4567, (555) 123-4567, +1 555 123 4567)
static NANP_PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+1[-.\s]?)?(?:\(\d{3}\)\s?|\b[2-9]\d{2}[-.\s]?)\d{3}[-.\s]?\d{4}\b").unwrap()
});

// Phone: international. `+`, country code, area code, then two to four
// groups sharing one separator kind, or up to 15 contiguous digits.
static INTL_PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\+\d{1,3}[-.\s]\d{1,4}(?:(?: \d{2,4}){2,4}|(?:-\d{2,4}){2,4}|(?:\.\d{2,4}){2,4})\b|\+\d{8,15}\b",
    )
    .unwrap()
});

// Credit card: contiguous 13-19 digits, 4-4-4-x groups, or Amex 4-6-5 groups.
// A candidate failing Luhn is retried from its next character, so
// "1234 4111 1111 1111 1111" still yields the card after the leading group.
static CREDIT_CARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d{13,19}|\d{4}(?:[ -]\d{4}){2}[ -]\d{1,7}|\d{4}[ -]\d{6}[ -]\d{4,5})\b")
        .unwrap()
});

const SSN_CONTEXT: &[&str] = &["ssn", "ssns", "social", "social security", "security number"];
const PHONE_CONTEXT: &[&str] = &["phone", "call", "tel", "telephone", "mobile", "cell", "number"];
const CARD_CONTEXT: &[&str] = &["card", "credit", "visa", "mastercard", "amex", "debit"];

/// Country code, area code and two groups.
const INTL_MIN_GROUPS: usize = 4;

/// Taken off a grouped candidate whose last group runs on into a
/// `-` or `.` joined digit.
const RUN_ON_PENALTY: f64 = 0.05;

/// Language the built-in recognizers are written for.
pub const LANGUAGE: &str = "en";

// =============================================================================
// Shape
// =============================================================================

/// One compiled pattern with its structural check.
#[derive(Debug, Clone, Copy)]
struct Shape {
    regex: &'static Regex,
    validator: Option<fn(&str) -> bool>,
    /// When set, every separator-aligned prefix with at least this many
    /// digit groups is a candidate as well as the full match.
    min_groups: Option<usize>,
}

impl Shape {
    fn new(regex: &'static Regex, validator: Option<fn(&str) -> bool>) -> Self {
        Self {
            regex,
            validator,
            min_groups: None,
        }
    }

    fn grouped(mut self, min_groups: usize) -> Self {
        self.min_groups = Some(min_groups);
        self
    }

    /// Candidate lengths within `matched`, longest first.
    fn candidate_lens(&self, matched: &str) -> Vec<usize> {
        let mut lens = vec![matched.len()];
        if let Some(min) = self.min_groups {
            lens.extend(
                matched
                    .char_indices()
                    .rev()
                    .filter(|&(i, c)| i > 0 && matches!(c, ' ' | '-' | '.'))
                    .map(|(i, _)| i)
                    .filter(|&i| digit_groups(&matched[..i]) >= min),
            );
        }
        lens
    }

    fn accepts(&self, candidate: &str) -> bool {
        self.validator.is_none_or(|validate| validate(candidate))
    }
}

fn digit_groups(s: &str) -> usize {
    s.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .count()
}

/// `rest` continues the number: a `-` or `.` followed by a digit.
fn runs_on(rest: &str) -> bool {
    let mut chars = rest.chars();
    matches!(chars.next(), Some('-' | '.')) && chars.next().is_some_and(|c| c.is_ascii_digit())
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    at + text[at..].chars().next().map_or(1, char::len_utf8)
}

// =============================================================================
// BuiltinRecognizer
// =============================================================================

/// A pattern-plus-validation recognizer shipped with the gateway.
#[derive(Debug, Clone)]
pub struct BuiltinRecognizer {
    name: &'static str,
    entity: [EntityType; 1],
    shapes: Vec<Shape>,
    base_score: f64,
    context: ContextWords,
}

impl BuiltinRecognizer {
    /// US Social Security Numbers.
    pub fn ssn() -> Self {
        Self {
            name: "builtin_ssn",
            entity: [EntityType::Ssn],
            shapes: vec![Shape::new(&SSN_RE, Some(ssn_valid))],
            base_score: 0.5,
            context: ContextWords::new(SSN_CONTEXT.iter().copied(), 0.35),
        }
    }

    /// Email addresses.
    pub fn email() -> Self {
        Self {
            name: "builtin_email",
            entity: [EntityType::EmailAddress],
            shapes: vec![Shape::new(&EMAIL_RE, None)],
            base_score: 1.0,
            context: ContextWords::none(),
        }
    }

    /// NANP and `+`-prefixed international phone numbers.
    ///
    /// An international match that swallows a neighbouring token is also
    /// offered trimmed back to each earlier group, so the redactor can keep
    /// the number when the longer span loses an overlap.
    pub fn phone() -> Self {
        Self {
            name: "builtin_phone",
            entity: [EntityType::PhoneNumber],
            shapes: vec![
                Shape::new(&NANP_PHONE_RE, None),
                Shape::new(&INTL_PHONE_RE, Some(e164_valid)).grouped(INTL_MIN_GROUPS),
            ],
            base_score: 0.4,
            context: ContextWords::new(PHONE_CONTEXT.iter().copied(), 0.35),
        }
    }

    /// Luhn-valid payment card numbers.
    pub fn credit_card() -> Self {
        Self {
            name: "builtin_credit_card",
            entity: [EntityType::CreditCard],
            shapes: vec![Shape::new(&CREDIT_CARD_RE, Some(luhn_valid))],
            base_score: 0.9,
            context: ContextWords::new(CARD_CONTEXT.iter().copied(), 0.1),
        }
    }

    /// The built-in recognizer for `entity`, if one ships.
    ///
    /// API keys have no built-in; they are covered by pattern recognizers.
    pub fn for_entity(entity: EntityType) -> Option<Self> {
        match entity {
            EntityType::Ssn => Some(Self::ssn()),
            EntityType::EmailAddress => Some(Self::email()),
            EntityType::PhoneNumber => Some(Self::phone()),
            EntityType::CreditCard => Some(Self::credit_card()),
            EntityType::ApiKey => None,
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity[0]
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    fn scan_shape(&self, shape: &Shape, text: &str, findings: &mut Vec<Finding>) {
        let mut pos = 0;
        while pos <= text.len() {
            let Some(m) = shape.regex.find_at(text, pos) else {
                break;
            };

            let mut accepted = false;
            for len in shape.candidate_lens(m.as_str()) {
                let end = m.start() + len;
                if !shape.accepts(&text[m.start()..end]) {
                    continue;
                }
                let mut confidence = self.context.score(text, m.start(), self.base_score);
                if shape.min_groups.is_some() && runs_on(&text[end..]) {
                    confidence -= RUN_ON_PENALTY;
                }
                findings.push(Finding::new(self.entity(), m.start(), end, confidence));
                accepted = true;
            }

            pos = if accepted && m.end() > m.start() {
                m.end()
            } else {
                next_char_boundary(text, m.start())
            };
        }
    }
}

impl Recognizer for BuiltinRecognizer {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_entities(&self) -> &[EntityType] {
        &self.entity
    }

    fn analyze(&self, text: &str) -> Result<Vec<Finding>, DetectionError> {
        let mut findings = Vec::new();
        for shape in &self.shapes {
            self.scan_shape(shape, text, &mut findings);
        }

        findings.sort_by_key(Finding::key);
        Ok(findings)
    }
}

// =============================================================================
// Tests
// =============================================================================
