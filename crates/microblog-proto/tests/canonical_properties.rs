//! Property-based tests for the canonical encoding
//!
//! The encoding is what signatures cover, so it must be a pure function of the
//! signable fields and must change whenever any of them changes.

use microblog_proto::{Attachment, Message, SignableFields, encode};
use proptest::prelude::*;

fn arbitrary_message() -> impl Strategy<Value = Message> {
    (
        "[0-9T:Z-]{0,25}",
        "\\PC{0,16}",
        any::<String>(),
        prop::option::of(prop::collection::vec(any::<u8>(), 0..256)),
        prop::option::of(any::<u64>()),
    )
        .prop_map(|(date, author, text, attachment, id)| {
            let mut msg =
                Message::new(date, author, text, attachment.as_deref().map(Attachment::from_bytes));
            msg.id = id;
            msg
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: encoding the same fields twice yields identical bytes
    #[test]
    fn prop_encoding_is_deterministic(msg in arbitrary_message()) {
        let first = msg.canonical_bytes()?;
        let second = msg.clone().canonical_bytes()?;
        prop_assert_eq!(first, second);
    }

    /// Property: id and signature never influence the encoding
    #[test]
    fn prop_id_and_signature_are_excluded(
        msg in arbitrary_message(),
        id in any::<u64>(),
        signature in any::<String>(),
    ) {
        let mut stamped = msg.clone();
        stamped.id = Some(id);
        stamped.signature = Some(signature);

        prop_assert_eq!(msg.canonical_bytes()?, stamped.canonical_bytes()?);
    }

    /// Property: the encoding survives a wire round trip unchanged
    #[test]
    fn prop_wire_round_trip_preserves_encoding(msg in arbitrary_message()) {
        let wire = msg.to_json()?;
        let received = Message::from_json(&wire)?;

        prop_assert_eq!(msg.canonical_bytes()?, received.canonical_bytes()?);
    }

    /// Property: changing the text changes the encoding
    #[test]
    fn prop_text_change_changes_encoding(msg in arbitrary_message(), suffix in "\\PC{1,8}") {
        let mut tampered = msg.clone();
        tampered.text.push_str(&suffix);

        prop_assert_ne!(msg.canonical_bytes()?, tampered.canonical_bytes()?);
    }

    /// Property: encoded output is always a single compact JSON object
    #[test]
    fn prop_output_parses_as_object(msg in arbitrary_message()) {
        let bytes = msg.canonical_bytes()?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        prop_assert!(value.is_object());
    }
}

#[test]
fn canonical_encoding_snapshot() {
    let fields = SignableFields {
        date: "2024-01-01T00:00:00Z",
        author: "alice",
        text: "hello",
        attachment: Some("aGk="),
    };

    let encoded = String::from_utf8(encode(&fields).unwrap()).unwrap();
    insta::assert_snapshot!(
        encoded,
        @r#"{"date":"2024-01-01T00:00:00Z","author":"alice","message":"hello","attachment":"aGk="}"#
    );
}
