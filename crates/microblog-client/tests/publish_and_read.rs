//! End-to-end publish and read against an in-memory store
//!
//! An identity is created on disk, messages are signed and published, then
//! read back, verified and their attachments materialized.

use std::fs;

use microblog_client::{
    AttachmentSaver, ClientError, FeedReader, FeedStore, FixedAnswer, FixedEnv, Identity,
    IdentityStore, Keyring, MemoryFeed, Publisher, SaveOutcome, ScriptedConfirm, Verifier,
    WalkRequest, verify_message,
};
use microblog_proto::Message;
use proptest::prelude::*;
use tempfile::tempdir;

fn create_alice(dir: &std::path::Path) -> Identity {
    IdentityStore::new(dir.join("identity.mb"))
        .create("alice", &FixedEnv::with_seed(7), &mut FixedAnswer(true))
        .unwrap()
}

#[test]
fn hello_verifies_and_flipped_character_does_not() {
    let dir = tempdir().unwrap();
    let alice = create_alice(dir.path());
    let feed = MemoryFeed::new();
    let env = FixedEnv::with_seed(0);

    let stored = Publisher::new(&alice, &feed, &env).publish("hello", None).unwrap();
    assert!(verify_message(&stored, alice.verifying_key()).unwrap());

    let mut flipped = stored.clone();
    flipped.text = "hellp".to_string();
    assert!(!verify_message(&flipped, alice.verifying_key()).unwrap());
}

#[test]
fn loaded_identity_verifies_what_it_published() {
    let dir = tempdir().unwrap();
    let created = create_alice(dir.path());
    let feed = MemoryFeed::new();
    let env = FixedEnv::with_seed(0);
    Publisher::new(&created, &feed, &env).publish("first", None).unwrap();
    Publisher::new(&created, &feed, &env).publish("second", None).unwrap();

    let loaded = IdentityStore::new(dir.path().join("identity.mb")).load().unwrap();
    let reader = FeedReader::new(&feed, Verifier::new(Keyring::with_identity(&loaded)));
    let messages = reader.collect(WalkRequest::latest(10)).unwrap();

    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["second", "first"]);
}

#[test]
fn reader_with_public_identity_file() {
    let dir = tempdir().unwrap();
    let alice = create_alice(dir.path());
    let keys = dir.path().join("keys");
    fs::create_dir(&keys).unwrap();
    alice.export_public(&keys.join("alice.pub")).unwrap();

    let feed = MemoryFeed::new();
    Publisher::new(&alice, &feed, &FixedEnv::with_seed(0)).publish("hi bob", None).unwrap();

    let mut keyring = Keyring::new();
    keyring.load_dir(&keys).unwrap();
    let messages = FeedReader::new(&feed, Verifier::new(keyring))
        .collect(WalkRequest::latest(1))
        .unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].author, "alice");
}

#[test]
fn oversized_attachment_rejected_before_store() {
    let dir = tempdir().unwrap();
    let alice = create_alice(dir.path());
    let big = dir.path().join("big.bin");
    fs::write(&big, vec![0u8; 65]).unwrap();
    let feed = MemoryFeed::new();

    let err = Publisher::new(&alice, &feed, &FixedEnv::with_seed(0))
        .with_max_attachment_bytes(64)
        .publish("look", Some(&big))
        .unwrap_err();

    assert!(matches!(err, ClientError::SizeExceeded { size: 65, max: 64, .. }));
    assert!(feed.requests().is_empty());
}

#[test]
fn attachment_round_trip() {
    let dir = tempdir().unwrap();
    let alice = create_alice(dir.path());
    let source = dir.path().join("photo.bin");
    let payload: Vec<u8> = (0..=255).collect();
    fs::write(&source, &payload).unwrap();

    let feed = MemoryFeed::new();
    let stored = Publisher::new(&alice, &feed, &FixedEnv::with_seed(0))
        .publish("see attached", Some(&source))
        .unwrap();
    assert!(stored.has_attachment());

    let reader = FeedReader::new(&feed, Verifier::new(Keyring::with_identity(&alice)));
    let message = reader.collect(WalkRequest::latest(1)).unwrap().remove(0);

    let saver = AttachmentSaver::new(dir.path().join("out"));
    let outcome = saver.save(&message, &mut FixedAnswer(false)).unwrap();

    let target = saver.target_path(1);
    assert_eq!(outcome, SaveOutcome::Saved(target.clone()));
    assert_eq!(fs::read(target).unwrap(), payload);
}

#[test]
fn declined_overwrite_keeps_existing_file() {
    let dir = tempdir().unwrap();
    let alice = create_alice(dir.path());
    let source = dir.path().join("new.txt");
    fs::write(&source, b"new contents").unwrap();

    let feed = MemoryFeed::new();
    Publisher::new(&alice, &feed, &FixedEnv::with_seed(0))
        .publish("attached", Some(&source))
        .unwrap();
    let message = FeedReader::new(&feed, Verifier::new(Keyring::with_identity(&alice)))
        .collect(WalkRequest::latest(1))
        .unwrap()
        .remove(0);

    let saver = AttachmentSaver::new(dir.path());
    fs::write(saver.target_path(1), b"old contents").unwrap();

    let mut confirm = ScriptedConfirm::new([false]);
    let outcome = saver.save(&message, &mut confirm).unwrap();

    assert_eq!(outcome, SaveOutcome::Declined(saver.target_path(1)));
    assert_eq!(confirm.asked().len(), 1);
    assert_eq!(fs::read(saver.target_path(1)).unwrap(), b"old contents");

    let outcome = saver.save(&message, &mut FixedAnswer(true)).unwrap();
    assert_eq!(outcome, SaveOutcome::Saved(saver.target_path(1)));
    assert_eq!(fs::read(saver.target_path(1)).unwrap(), b"new contents");
}

#[test]
fn message_without_attachment_saves_nothing() {
    let dir = tempdir().unwrap();
    let alice = create_alice(dir.path());
    let feed = MemoryFeed::new();
    Publisher::new(&alice, &feed, &FixedEnv::with_seed(0)).publish("plain", None).unwrap();

    let message = FeedReader::new(&feed, Verifier::new(Keyring::with_identity(&alice)))
        .collect(WalkRequest::latest(1))
        .unwrap()
        .remove(0);

    let saver = AttachmentSaver::new(dir.path().join("out"));
    assert_eq!(saver.save(&message, &mut FixedAnswer(true)).unwrap(), SaveOutcome::NoAttachment);
    assert!(!saver.dir().exists());
}

#[test]
fn published_message_survives_wire_round_trip() {
    let dir = tempdir().unwrap();
    let alice = create_alice(dir.path());
    let feed = MemoryFeed::new();
    let stored = Publisher::new(&alice, &feed, &FixedEnv::with_seed(0))
        .publish("über ✓ \"quoted\"", None)
        .unwrap();

    let decoded = Message::from_json(&stored.to_json().unwrap()).unwrap();
    assert!(verify_message(&decoded, alice.verifying_key()).unwrap());
    assert_eq!(feed.latest(1).unwrap(), [stored]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: changing any signable field invalidates the signature
    #[test]
    fn prop_tamper_any_field(
        text in "[a-zA-Z0-9 ]{1,40}",
        field in 0usize..4,
        suffix in "[a-z]{1,4}"
    ) {
        let alice = Identity::from_signing_key(
            "alice",
            microblog_crypto::generate_signing_key([21; 32]),
        ).unwrap();
        let feed = MemoryFeed::new();
        let mut message = Publisher::new(&alice, &feed, &FixedEnv::with_seed(0))
            .publish(&text, None)
            .unwrap();

        match field {
            0 => message.date.push_str(&suffix),
            1 => message.author.push_str(&suffix),
            2 => message.text.push_str(&suffix),
            _ => message.attachment = Some(microblog_proto::Attachment::from_bytes(suffix.as_bytes())),
        }

        prop_assert!(!verify_message(&message, alice.verifying_key()).unwrap());
    }
}
