//! Fuzz target for the feed walker against a hostile store
//!
//! # Strategy
//!
//! - Scripted responses: arbitrary ids, duplicates, gaps, ascending runs
//! - Unsigned and correctly signed messages mixed in one page
//! - Arbitrary start, count and page cap
//!
//! # Invariants
//!
//! - Emitted ids are strictly decreasing
//! - Every emitted id is at most the `next` of the page that produced it
//! - Never more than `count` messages emitted
//! - Errors end the walk; NEVER panic

#![no_main]

use std::collections::VecDeque;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use microblog_client::{
    FeedWalker, Identity, Keyring, Verifier, WalkAction, WalkEvent, WalkRequest, WalkState,
};
use microblog_crypto::{generate_signing_key, sign};
use microblog_proto::Message;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    start: Option<u16>,
    count: u8,
    page_cap: u8,
    responses: Vec<Vec<Entry>>,
}

#[derive(Debug, Arbitrary)]
struct Entry {
    id: Option<u16>,
    signed: bool,
}

fuzz_target!(|input: FuzzInput| {
    let key = generate_signing_key([7; 32]);
    let Ok(alice) = Identity::from_signing_key("alice", key.clone()) else {
        return;
    };
    let verifier = Verifier::new(Keyring::with_identity(&alice));

    let message = |entry: &Entry| {
        let mut message = Message::new("2024-01-01T00:00:00Z", "alice", "fuzz", None);
        if entry.signed {
            if let Ok(canonical) = message.canonical_bytes() {
                message.signature = Some(sign(&canonical, &key));
            }
        }
        message.id = entry.id.map(u64::from);
        message
    };
    let mut responses: VecDeque<Vec<Message>> =
        input.responses.iter().map(|page| page.iter().map(&message).collect()).collect();

    let request = WalkRequest { start: input.start.map(u64::from), count: usize::from(input.count) };
    let mut walker = FeedWalker::new(&verifier, request, usize::from(input.page_cap));

    let mut actions: VecDeque<WalkAction> = walker.start().into();
    let mut emitted = Vec::new();
    let mut bound = u64::MAX;

    while let Some(action) = actions.pop_front() {
        let event = match action {
            WalkAction::FetchLatest => WalkEvent::Latest(responses.pop_front().unwrap_or_default()),
            WalkAction::FetchPage { limit, next } => {
                assert!(limit >= 1);
                bound = next;
                WalkEvent::Page(responses.pop_front().unwrap_or_default())
            },
            WalkAction::Emit(verified) => {
                assert!(verified.id() <= bound);
                if let Some(&last) = emitted.last() {
                    assert!(verified.id() < last);
                }
                emitted.push(verified.id());
                continue;
            },
            WalkAction::Finish(_) => {
                assert_eq!(walker.state(), WalkState::Done);
                break;
            },
        };

        match walker.handle(event) {
            Ok(next) => actions.extend(next),
            Err(_) => {
                assert_eq!(walker.state(), WalkState::Done);
                break;
            },
        }
    }

    assert!(emitted.len() <= usize::from(input.count));
});
