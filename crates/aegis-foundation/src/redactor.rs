//! Redactor
//!
//! Substitutes every finding's span according to the [`RedactionPolicy`].
//!
//! Overlapping findings are resolved first: the winner is the finding with
//! the higher confidence, then the longer span, then the lower start offset,
//! then the entity name in ascending order. Losers are discarded. The
//! surviving spans are disjoint and are replaced from the end of the text
//! towards the start so earlier offsets stay valid. Bytes outside the spans
//! are copied unchanged.

use aegis_kernel::error::RedactionError;
use aegis_kernel::security::{EntityType, Finding, RedactionPolicy, RedactionStrategy};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;

/// Hex characters of the span digest used by [`RedactionStrategy::Hash`].
const HASH_PREFIX_LEN: usize = 8;

/// Result of a redaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Redaction {
    /// Sanitized text
    pub text: String,
    /// Findings whose spans were substituted, in textual order
    pub applied: Vec<Finding>,
}

/// Applies a fixed [`RedactionPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    policy: RedactionPolicy,
}

impl Redactor {
    pub fn new(policy: RedactionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }

    /// Sanitizes `text`.
    ///
    /// Fails closed: if any finding has an invalid span or an entity type
    /// without a rule, no text is produced at all.
    pub fn redact(&self, text: &str, findings: &[Finding]) -> Result<Redaction, RedactionError> {
        for finding in findings {
            if !finding.fits(text) {
                return Err(RedactionError::InvalidSpan {
                    start: finding.start,
                    end: finding.end,
                    len: text.len(),
                });
            }
            if self.policy.strategy_for(finding.entity_type).is_none() {
                return Err(RedactionError::PolicyMissing(finding.entity_type));
            }
        }

        let applied = resolve_overlaps(findings);
        let mut sanitized = text.to_string();

        for finding in applied.iter().rev() {
            let strategy = self
                .policy
                .strategy_for(finding.entity_type)
                .ok_or(RedactionError::PolicyMissing(finding.entity_type))?;
            let span = &text[finding.start..finding.end];
            let replacement = substitute(span, finding.entity_type, strategy);
            sanitized.replace_range(finding.start..finding.end, &replacement);
        }

        Ok(Redaction {
            text: sanitized,
            applied,
        })
    }
}

/// One-shot form of [`Redactor::redact`] returning only the text.
pub fn redact(
    text: &str,
    findings: &[Finding],
    policy: &RedactionPolicy,
) -> Result<String, RedactionError> {
    Redactor::new(policy.clone())
        .redact(text, findings)
        .map(|r| r.text)
}

/// Picks a disjoint subset of `findings` by the overlap tie-break and
/// returns it sorted by start offset.
pub fn resolve_overlaps(findings: &[Finding]) -> Vec<Finding> {
    let mut ranked: Vec<Finding> = findings.to_vec();
    ranked.sort_by(precedence);

    let mut kept: Vec<Finding> = Vec::with_capacity(ranked.len());
    for candidate in ranked {
        if !kept.iter().any(|k| k.overlaps(&candidate)) {
            kept.push(candidate);
        }
    }

    kept.sort_by_key(|f| f.start);
    kept
}

/// Winner first.
fn precedence(a: &Finding, b: &Finding) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.entity_type.as_str().cmp(b.entity_type.as_str()))
        .then_with(|| a.end.cmp(&b.end))
}

/// Replacement text for one span.
pub fn substitute(span: &str, entity: EntityType, strategy: &RedactionStrategy) -> String {
    match strategy {
        RedactionStrategy::Replace { placeholder } => match placeholder {
            Some(p) => p.clone(),
            None => format!("<{entity}>"),
        },
        RedactionStrategy::Redact => String::new(),
        RedactionStrategy::Mask {
            masking_char,
            chars_to_mask,
            from_end,
        } => mask(span, *masking_char, *chars_to_mask, *from_end),
        RedactionStrategy::Hash => {
            let digest = hex::encode(Sha256::digest(span.as_bytes()));
            format!("<{entity}:{}>", &digest[..HASH_PREFIX_LEN])
        }
        _ => format!("<{entity}>"),
    }
}

fn mask(span: &str, masking_char: char, chars_to_mask: Option<usize>, from_end: bool) -> String {
    let total = span.chars().count();
    let n = chars_to_mask.unwrap_or(total).min(total);
    let (lo, hi) = if from_end { (total - n, total) } else { (0, n) };

    span.chars()
        .enumerate()
        .map(|(i, c)| if (lo..hi).contains(&i) { masking_char } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_at(text: &str, needle: &str) -> Finding {
        let start = text.find(needle).unwrap();
        Finding::new(EntityType::EmailAddress, start, start + needle.len(), 1.0)
    }

    #[test]
    fn replaces_with_default_placeholders() {
        let text = "My email is test@example.com and key is sk-proj-12345abcde";
        let key_start = text.find("sk-").unwrap();
        let findings = vec![
            email_at(text, "test@example.com"),
            Finding::new(EntityType::ApiKey, key_start, text.len(), 0.9),
        ];
        let out = redact(text, &findings, &RedactionPolicy::default()).unwrap();
        assert_eq!(out, "My email is <EMAIL_ADDRESS> and key is <API_KEY>");
    }

    #[test]
    fn replacement_order_does_not_shift_offsets() {
        let text = "a@b.io x c@d.io y e@f.io";
        // deliberately unsorted input
        let findings = vec![
            email_at(text, "e@f.io"),
            email_at(text, "a@b.io"),
            email_at(text, "c@d.io"),
        ];
        let policy = RedactionPolicy::default()
            .with_rule(EntityType::EmailAddress, RedactionStrategy::replace("[a much longer marker]"));
        let out = redact(text, &findings, &policy).unwrap();
        assert_eq!(
            out,
            "[a much longer marker] x [a much longer marker] y [a much longer marker]"
        );
    }

    #[test]
    fn overlap_prefers_higher_confidence() {
        let text = "card 4111111111111111 end";
        let findings = vec![
            Finding::new(EntityType::PhoneNumber, 11, 21, 0.6),
            Finding::new(EntityType::CreditCard, 5, 21, 0.9),
        ];
        let out = Redactor::default().redact(text, &findings).unwrap();
        assert_eq!(out.text, "card <CREDIT_CARD> end");
        assert_eq!(out.applied, vec![findings[1]]);
    }

    #[test]
    fn overlap_tie_breaks_by_length_then_start_then_name() {
        let longer = Finding::new(EntityType::PhoneNumber, 0, 10, 0.5);
        let shorter = Finding::new(EntityType::Ssn, 2, 8, 0.5);
        assert_eq!(resolve_overlaps(&[shorter, longer]), vec![longer]);

        let left = Finding::new(EntityType::PhoneNumber, 0, 6, 0.5);
        let right = Finding::new(EntityType::Ssn, 3, 9, 0.5);
        assert_eq!(resolve_overlaps(&[right, left]), vec![left]);

        let card = Finding::new(EntityType::CreditCard, 0, 6, 0.5);
        let phone = Finding::new(EntityType::PhoneNumber, 0, 6, 0.5);
        assert_eq!(resolve_overlaps(&[phone, card]), vec![card]);
    }

    #[test]
    fn disjoint_findings_all_survive() {
        let a = Finding::new(EntityType::Ssn, 0, 3, 0.1);
        let b = Finding::new(EntityType::Ssn, 3, 6, 0.9);
        assert_eq!(resolve_overlaps(&[b, a]), vec![a, b]);
    }

    #[test]
    fn missing_policy_fails_closed() {
        let text = "reach me at test@example.com";
        let policy = RedactionPolicy::default().without_rule(EntityType::EmailAddress);
        assert_eq!(
            redact(text, &[email_at(text, "test@example.com")], &policy),
            Err(RedactionError::PolicyMissing(EntityType::EmailAddress))
        );
    }

    #[test]
    fn missing_policy_for_discarded_overlap_still_fails() {
        let text = "4111111111111111";
        let findings = vec![
            Finding::new(EntityType::CreditCard, 0, 16, 0.9),
            Finding::new(EntityType::PhoneNumber, 6, 16, 0.4),
        ];
        let policy = RedactionPolicy::default().without_rule(EntityType::PhoneNumber);
        assert!(matches!(
            redact(text, &findings, &policy),
            Err(RedactionError::PolicyMissing(EntityType::PhoneNumber))
        ));
    }

    #[test]
    fn invalid_span_is_rejected() {
        let err = redact("short", &[Finding::new(EntityType::Ssn, 2, 50, 1.0)], &RedactionPolicy::default())
            .unwrap_err();
        assert_eq!(err, RedactionError::InvalidSpan { start: 2, end: 50, len: 5 });
    }

    #[test]
    fn strategies() {
        let span = "555-123-4567";
        let entity = EntityType::PhoneNumber;

        assert_eq!(substitute(span, entity, &RedactionStrategy::default()), "<PHONE_NUMBER>");
        assert_eq!(substitute(span, entity, &RedactionStrategy::replace("[tel]")), "[tel]");
        assert_eq!(substitute(span, entity, &RedactionStrategy::Redact), "");
        assert_eq!(substitute(span, entity, &RedactionStrategy::mask_all()), "************");
        assert_eq!(
            substitute(
                span,
                entity,
                &RedactionStrategy::Mask {
                    masking_char: '#',
                    chars_to_mask: Some(8),
                    from_end: false,
                }
            ),
            "########4567"
        );
        assert_eq!(
            substitute(
                span,
                entity,
                &RedactionStrategy::Mask {
                    masking_char: '*',
                    chars_to_mask: Some(4),
                    from_end: true,
                }
            ),
            "555-123-****"
        );

        let hashed = substitute(span, entity, &RedactionStrategy::Hash);
        assert!(hashed.starts_with("<PHONE_NUMBER:"));
        assert_eq!(hashed.len(), "<PHONE_NUMBER:>".len() + HASH_PREFIX_LEN);
        assert_eq!(hashed, substitute(span, entity, &RedactionStrategy::Hash));
        assert_ne!(hashed, substitute("555-123-4568", entity, &RedactionStrategy::Hash));
    }

    #[test]
    fn mask_counts_characters_not_bytes() {
        assert_eq!(mask("héllo", '*', Some(2), false), "**llo");
        assert_eq!(mask("héllo", '*', Some(99), true), "*****");
    }

    #[test]
    fn text_outside_spans_is_untouched() {
        let text = "héllo wörld a@b.io ünïcode";
        let finding = email_at(text, "a@b.io");
        let out = redact(text, &[finding], &RedactionPolicy::default()).unwrap();
        assert_eq!(&out[..finding.start], &text[..finding.start]);
        assert!(out.ends_with(&text[finding.end..]));
    }

    #[test]
    fn no_findings_is_identity() {
        let text = "nothing to see";
        assert_eq!(redact(text, &[], &RedactionPolicy::empty()).unwrap(), text);
    }
}
