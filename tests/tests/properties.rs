//! Property tests for the sanitization pipeline.

use aegis_foundation::{AuditCipher, GatewaySettings, SecretKey};
use aegis_testing::{gateway_with, test_key};
use proptest::prelude::*;

/// One piece of a generated prompt: the text as written and the text the
/// gateway must turn it into.
#[derive(Debug, Clone)]
struct Piece {
    original: String,
    sanitized: String,
    secret: Option<String>,
}

fn plain(word: String) -> Piece {
    Piece {
        original: word.clone(),
        sanitized: word,
        secret: None,
    }
}

fn secret(prefix: &str, value: String, placeholder: &str) -> Piece {
    Piece {
        original: format!("{prefix}{value}"),
        sanitized: format!("{prefix}{placeholder}"),
        secret: Some(value),
    }
}

fn filler() -> impl Strategy<Value = String> {
    "[a-z]{3,8}"
}

fn email() -> impl Strategy<Value = Piece> {
    ("[a-z]{3,8}", "[a-z]{3,8}").prop_map(|(user, domain)| {
        secret("", format!("{user}@{domain}.com"), "<EMAIL_ADDRESS>")
    })
}

fn api_key() -> impl Strategy<Value = Piece> {
    "[A-Za-z]{4}[A-Za-z0-9]{8}".prop_map(|tail| secret("", format!("sk-proj-{tail}"), "<API_KEY>"))
}

fn card() -> impl Strategy<Value = Piece> {
    prop_oneof![
        Just("4111-1111-1111-1111"),
        Just("4111 1111 1111 1111"),
        Just("5555 5555 5555 4444"),
        Just("4012888888881881"),
    ]
    .prop_map(|number| secret("card ", number.to_string(), "<CREDIT_CARD>"))
}

fn phone() -> impl Strategy<Value = Piece> {
    ("[2-9][0-9]{2}", "[0-9]{3}", "[0-9]{4}").prop_map(|(area, exchange, line)| {
        secret("call ", format!("({area}) {exchange}-{line}"), "<PHONE_NUMBER>")
    })
}

fn ssn() -> impl Strategy<Value = Piece> {
    (1u32..666, 1u32..100, 1u32..10000).prop_map(|(area, group, serial)| {
        secret("ssn ", format!("{area:03}-{group:02}-{serial:04}"), "<SSN>")
    })
}

fn piece() -> impl Strategy<Value = Piece> {
    prop_oneof![
        3 => filler().prop_map(plain),
        1 => email(),
        1 => api_key(),
        1 => card(),
        1 => phone(),
        1 => ssn(),
    ]
}

/// Pieces separated by filler words so no two secrets touch.
fn prompt() -> impl Strategy<Value = Vec<Piece>> {
    prop::collection::vec((filler(), piece()), 1..8).prop_map(|pairs| {
        pairs
            .into_iter()
            .flat_map(|(word, piece)| [plain(word), piece])
            .collect()
    })
}

/// Digit-bearing secrets and bare numbers that may be written back to back.
fn touching_token() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("4111 1111 1111 1111"),
        Just("4111-1111-1111-1111"),
        Just("4012888888881881"),
        Just("123-45-6789"),
        Just("078-05-1120"),
        Just("555-123-4567"),
        Just("(555) 987-6543"),
        Just("+44 20 7946 0958"),
        Just("alice@example.com"),
        Just("sk-proj-Abcd12345678"),
        Just("1234"),
        Just("2027"),
    ]
}

/// Tokens joined by a single space, a single hyphen, or nothing.
fn touching_prompt() -> impl Strategy<Value = String> {
    let joint = prop_oneof![Just(" "), Just("-"), Just("")];
    (touching_token(), prop::collection::vec((joint, touching_token()), 1..6)).prop_map(
        |(first, rest)| {
            rest.into_iter().fold(first.to_string(), |mut text, (joint, token)| {
                text.push_str(joint);
                text.push_str(token);
                text
            })
        },
    )
}

fn join(pieces: &[Piece], part: impl Fn(&Piece) -> &str) -> String {
    pieces.iter().map(part).collect::<Vec<_>>().join(" ")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn secrets_are_replaced_and_everything_else_is_kept(pieces in prompt()) {
        let (gateway, _sink) = gateway_with(GatewaySettings::default());
        let original = join(&pieces, |p| &p.original);
        let expected = join(&pieces, |p| &p.sanitized);

        let output = gateway.process(&original, "prop").unwrap();
        for value in pieces.iter().filter_map(|p| p.secret.as_deref()) {
            prop_assert!(
                !output.sanitized_text.contains(value),
                "secret {} leaked into {}",
                value,
                output.sanitized_text
            );
        }
        prop_assert_eq!(&output.sanitized_text, &expected);
    }

    #[test]
    fn sanitizing_twice_changes_nothing(pieces in prompt()) {
        let (gateway, _sink) = gateway_with(GatewaySettings::default());
        let original = join(&pieces, |p| &p.original);

        let first = gateway.process(&original, "prop").unwrap();
        prop_assert!(gateway.scan(&first.sanitized_text).unwrap().is_empty());

        let second = gateway.process(&first.sanitized_text, "prop").unwrap();
        prop_assert_eq!(&first.sanitized_text, &second.sanitized_text);
    }

    #[test]
    fn touching_tokens_leave_nothing_to_find(text in touching_prompt()) {
        let (gateway, _sink) = gateway_with(GatewaySettings::default());

        let output = gateway.process(&text, "prop").unwrap();
        let leftover = gateway.scan(&output.sanitized_text).unwrap();
        prop_assert!(
            leftover.is_empty(),
            "{} became {} and still holds {:?}",
            text,
            output.sanitized_text,
            leftover
        );
    }

    #[test]
    fn output_is_deterministic_but_blobs_are_fresh(pieces in prompt()) {
        let (gateway, _sink) = gateway_with(GatewaySettings::default());
        let original = join(&pieces, |p| &p.original);

        let a = gateway.process(&original, "prop").unwrap();
        let b = gateway.process(&original, "prop").unwrap();
        prop_assert_eq!(&a.sanitized_text, &b.sanitized_text);
        prop_assert_ne!(&a.ciphertext_blob, &b.ciphertext_blob);
    }

    #[test]
    fn any_text_round_trips_through_the_blob(text in "\\PC{0,200}") {
        let (gateway, sink) = gateway_with(GatewaySettings::default());
        let output = gateway.process(&text, "prop").unwrap();

        if text.trim().is_empty() {
            prop_assert!(output.is_empty());
            prop_assert!(sink.is_empty());
        } else {
            let cipher = AuditCipher::new(&test_key());
            prop_assert_eq!(cipher.decrypt(&output.ciphertext_blob).unwrap(), text.clone());

            let stranger = AuditCipher::new(&SecretKey::generate());
            prop_assert!(stranger.decrypt(&output.ciphertext_blob).is_err());

            let record = &sink.records()[0];
            prop_assert_eq!(record.original_length, text.chars().count());
            prop_assert_eq!(record.sanitized_length, output.sanitized_text.chars().count());
        }
    }
}
