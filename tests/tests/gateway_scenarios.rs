//! End-to-end gateway behavior with real detectors and scripted ones.

use aegis_foundation::{
    AuditCipher, EntityType, Gateway, GatewayError, GatewaySettings, PipelineStage,
    RedactionPolicy, RedactionStrategy,
};
use aegis_kernel::config::PatternRuleConfig;
use aegis_kernel::error::ConfigurationError;
use aegis_testing::{
    Behavior, FailingSink, MockRecognizer, assert_detector_called, gateway_with,
    gateway_with_detectors, test_key,
};
use aegis_foundation::Detector;
use std::sync::Arc;
use std::time::Duration;

const PROMPT: &str = "My email is test@example.com and key is sk-proj-12345abcde";

#[test]
fn reference_prompt_is_redacted_sealed_and_audited() {
    let settings =
        GatewaySettings::default().with_entities([EntityType::EmailAddress, EntityType::ApiKey]);
    let (gateway, sink) = gateway_with(settings);

    let output = gateway.process(PROMPT, "SEC-OPS-ALPHA").unwrap();
    assert_eq!(
        output.sanitized_text,
        "My email is <EMAIL_ADDRESS> and key is <API_KEY>"
    );

    let cipher = AuditCipher::new(&test_key());
    assert_eq!(cipher.decrypt(&output.ciphertext_blob).unwrap(), PROMPT);
    assert_eq!(
        cipher
            .decrypt_with_ttl(&output.ciphertext_blob, Duration::from_secs(60))
            .unwrap(),
        PROMPT
    );

    let record = &sink.records()[0];
    assert_eq!(record.actor_id, "SEC-OPS-ALPHA");
    assert_eq!(record.finding_count, 2);
    assert!(record.pii_redacted);
    assert_eq!(record.risk_score, 60);
    let json = record.to_json().unwrap();
    assert!(!json.contains("test@example.com"));
    assert!(!json.contains("sk-proj"));
}

#[test]
fn every_builtin_type_is_redacted() {
    let (gateway, sink) = gateway_with(GatewaySettings::default());
    let text = "SSN 123-45-6789, card 4111 1111 1111 1111, call (555) 987-6543";

    let output = gateway.process(text, "ops").unwrap();
    assert_eq!(
        output.sanitized_text,
        "SSN <SSN>, card <CREDIT_CARD>, call <PHONE_NUMBER>"
    );
    assert_eq!(sink.records()[0].risk_score, 95);
}

#[test]
fn adjacent_numbers_are_each_redacted() {
    let (gateway, _sink) = gateway_with(GatewaySettings::default());

    for (text, expected) in [
        ("order 1234 4111 1111 1111 1111", "order 1234 <CREDIT_CARD>"),
        ("exp 2027 4111-1111-1111-1111", "exp 2027 <CREDIT_CARD>"),
        ("555-123-4567 4111 1111 1111 1111", "<PHONE_NUMBER> <CREDIT_CARD>"),
        ("+44 20 7946 0958 123-45-6789", "<PHONE_NUMBER> <SSN>"),
        ("+44 20 7946 0958 4111 1111 1111 1111", "<PHONE_NUMBER> <CREDIT_CARD>"),
        ("+44 20 7946 0958 555-123-4567", "<PHONE_NUMBER> <PHONE_NUMBER>"),
    ] {
        let output = gateway.process(text, "ops").unwrap();
        assert_eq!(output.sanitized_text, expected, "{text}");
        assert!(gateway.scan(&output.sanitized_text).unwrap().is_empty(), "{text}");
    }
}

#[test]
fn strategies_from_settings() {
    let settings = GatewaySettings::default()
        .with_entities([EntityType::EmailAddress, EntityType::Ssn, EntityType::ApiKey])
        .with_redaction(EntityType::EmailAddress, RedactionStrategy::mask_all())
        .with_redaction(EntityType::Ssn, RedactionStrategy::Redact)
        .with_redaction(EntityType::ApiKey, RedactionStrategy::Hash);
    let (gateway, _sink) = gateway_with(settings);

    let output = gateway
        .process("a@b.io ssn 123-45-6789 sk-proj-12345abcde", "ops")
        .unwrap();
    let parts: Vec<&str> = output.sanitized_text.split(' ').collect();
    assert_eq!(parts[0], "******");
    assert_eq!(parts[1], "ssn");
    assert_eq!(parts[2], "");
    let hashed = regex::Regex::new(r"^<API_KEY:[0-9a-f]{8}>$").unwrap();
    assert!(hashed.is_match(parts[3]), "got {}", parts[3]);

    let again = gateway
        .process("a@b.io ssn 123-45-6789 sk-proj-12345abcde", "ops")
        .unwrap();
    assert_eq!(again.sanitized_text, output.sanitized_text);
}

#[test]
fn custom_pattern_rule_is_applied() {
    let settings = GatewaySettings::default()
        .with_entities([EntityType::ApiKey])
        .with_pattern(
            PatternRuleConfig::new("internal_token", EntityType::ApiKey, r"\bitk_[a-z0-9]{8}\b")
                .with_confidence(0.9),
        );
    let (gateway, _sink) = gateway_with(settings);

    let output = gateway.process("token itk_ab12cd34 here", "ops").unwrap();
    assert_eq!(output.sanitized_text, "token <API_KEY> here");
}

#[test]
fn threshold_drops_weak_findings() {
    let settings = GatewaySettings::default()
        .with_entities([EntityType::PhoneNumber])
        .with_min_confidence(0.5);
    let (gateway, sink) = gateway_with(settings);

    let bare = gateway.process("ref 555-987-6543", "ops").unwrap();
    assert_eq!(bare.sanitized_text, "ref 555-987-6543");

    let with_context = gateway.process("call 555-987-6543", "ops").unwrap();
    assert_eq!(with_context.sanitized_text, "call <PHONE_NUMBER>");

    let records = sink.records();
    assert!(!records[0].pii_redacted);
    assert!(records[1].pii_redacted);
}

#[test]
fn failing_and_panicking_detectors_are_recovered() {
    let failing = MockRecognizer::new("flaky_email", EntityType::EmailAddress)
        .with_finding(0, 3, 1.0)
        .with_behavior(Behavior::Fail);
    let panicking = MockRecognizer::new("broken_email", EntityType::EmailAddress)
        .with_finding(0, 3, 1.0)
        .with_behavior(Behavior::Panic);

    let (gateway, sink) = gateway_with_detectors(
        GatewaySettings::default().with_entities([EntityType::EmailAddress]),
        [
            Detector::custom(failing.clone()),
            Detector::custom(panicking.clone()),
        ],
    );

    let output = gateway.process("mail test@example.com", "ops").unwrap();
    assert_eq!(output.sanitized_text, "mail <EMAIL_ADDRESS>");
    assert_detector_called!(failing, 1);
    assert_detector_called!(panicking, 1);
    assert_eq!(sink.len(), 1);
}

#[test]
fn scripted_overlaps_resolve_to_the_strongest() {
    let weak = MockRecognizer::new("weak_ssn", EntityType::Ssn).with_finding(0, 6, 0.3);
    let strong = MockRecognizer::new("strong_card", EntityType::CreditCard).with_finding(2, 10, 0.9);

    let (gateway, sink) = gateway_with_detectors(
        GatewaySettings::default().with_entities([EntityType::Ssn, EntityType::CreditCard]),
        [Detector::custom(weak.clone()), Detector::custom(strong)],
    );

    let output = gateway.process("abcdefghijkl", "ops").unwrap();
    assert_eq!(output.sanitized_text, "ab<CREDIT_CARD>kl");
    assert_eq!(sink.records()[0].finding_count, 1);
    assert_eq!(weak.history(), vec!["abcdefghijkl".to_string()]);
}

#[test]
fn sink_failure_fails_the_call() {
    let sink = Arc::new(FailingSink::new());
    let gateway = Gateway::builder(GatewaySettings::default())
        .key(test_key())
        .sink(sink.clone())
        .build()
        .unwrap();

    let err = gateway.process(PROMPT, "ops").unwrap_err();
    assert!(matches!(err, GatewayError::Audit(_)));
    assert_eq!(err.stage(), PipelineStage::Logging);
    assert_eq!(sink.attempts(), 1);
}

#[test]
fn scan_budget_overrun_fails_without_record() {
    let slow = MockRecognizer::new("slow_email", EntityType::EmailAddress)
        .with_behavior(Behavior::Sleep(Duration::from_millis(60)));
    let (gateway, sink) = gateway_with_detectors(
        GatewaySettings::default()
            .with_entities([EntityType::EmailAddress])
            .with_scan_timeout_ms(10),
        [Detector::custom(slow)],
    );

    let err = gateway.process("mail test@example.com", "ops").unwrap_err();
    assert!(matches!(err, GatewayError::ScanTimeout { .. }));
    assert_eq!(err.stage(), PipelineStage::Scanning);
    assert!(sink.is_empty());
}

#[test]
fn uncovered_entity_fails_construction() {
    let err = Gateway::builder(GatewaySettings::default())
        .key(test_key())
        .policy(RedactionPolicy::default().without_rule(EntityType::PhoneNumber))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::PolicyMissing(EntityType::PhoneNumber)
    ));
}

#[test]
fn concurrent_callers_get_independent_results() {
    let (gateway, sink) = gateway_with(GatewaySettings::default());
    let gateway = Arc::new(gateway);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let gateway = Arc::clone(&gateway);
            std::thread::spawn(move || {
                let text = format!("user{i}@example.com says hi");
                let output = gateway.process(&text, &format!("actor-{i}")).unwrap();
                (text, output)
            })
        })
        .collect();

    let cipher = AuditCipher::new(&test_key());
    for handle in handles {
        let (text, output) = handle.join().unwrap();
        assert_eq!(output.sanitized_text, "<EMAIL_ADDRESS> says hi");
        assert_eq!(cipher.decrypt(&output.ciphertext_blob).unwrap(), text);
    }
    assert_eq!(sink.len(), 8);
}
