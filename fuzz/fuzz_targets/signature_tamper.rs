//! Fuzz target for signature verification
//!
//! # Strategy
//!
//! - Sign a message built from fuzzer-chosen fields
//! - Apply one mutation: flip a signature bit, change a field, swap the key
//!
//! # Invariants
//!
//! - The untouched message MUST verify
//! - Every mutation MUST fail verification
//! - NEVER panic on garbage signature text

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use microblog_client::verify_message;
use microblog_crypto::{generate_signing_key, sign};
use microblog_proto::{Attachment, Message};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    seed: [u8; 32],
    date: String,
    author: String,
    text: String,
    attachment: Option<Vec<u8>>,
    mutation: Mutation,
}

#[derive(Debug, Arbitrary)]
enum Mutation {
    FlipSignatureBit { byte: u8, bit: u8 },
    ReplaceSignature(String),
    AppendToText(char),
    ChangeAuthor(String),
    DropAttachment,
    OtherKey { seed: [u8; 32] },
}

fuzz_target!(|input: FuzzInput| {
    let key = generate_signing_key(input.seed);
    let attachment = input.attachment.as_deref().map(Attachment::from_bytes);
    let mut message = Message::new(input.date, input.author, input.text, attachment);
    let Ok(canonical) = message.canonical_bytes() else {
        return;
    };
    message.signature = Some(sign(&canonical, &key));

    assert_eq!(verify_message(&message, &key.verifying_key()), Ok(true));

    let mut verifying = key.verifying_key();
    match input.mutation {
        Mutation::FlipSignatureBit { byte, bit } => {
            let Some(signature) = message.signature.take() else {
                return;
            };
            let mut bytes = signature.into_bytes();
            let index = usize::from(byte) % bytes.len();
            bytes[index] ^= 1 << (bit % 7);
            let Ok(flipped) = String::from_utf8(bytes) else {
                return;
            };
            message.signature = Some(flipped);
        },
        Mutation::ReplaceSignature(garbage) => {
            if message.signature.as_deref() == Some(garbage.as_str()) {
                return;
            }
            message.signature = Some(garbage);
        },
        Mutation::AppendToText(c) => message.text.push(c),
        Mutation::ChangeAuthor(author) => {
            if author == message.author {
                return;
            }
            message.author = author;
        },
        Mutation::DropAttachment => {
            if message.attachment.take().is_none() {
                return;
            }
        },
        Mutation::OtherKey { seed } => {
            if seed == input.seed {
                return;
            }
            verifying = generate_signing_key(seed).verifying_key();
        },
    }

    assert_eq!(verify_message(&message, &verifying), Ok(false), "{message:?}");
});
