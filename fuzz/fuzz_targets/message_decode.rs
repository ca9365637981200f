//! Fuzz target for wire decoding
//!
//! Arbitrary bytes fed to the single-message and list decoders must either
//! fail cleanly or yield messages whose canonical form can be computed.
//!
//! # Invariants
//!
//! - NEVER panic on malformed JSON
//! - Any decoded message re-encodes and decodes to itself

#![no_main]

use libfuzzer_sys::fuzz_target;
use microblog_proto::Message;

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = Message::from_json(data) {
        let _ = message.canonical_bytes();
        if let Ok(json) = message.to_json() {
            let again = Message::from_json(&json).expect("re-encoded message must decode");
            assert_eq!(again, message);
        }
    }

    if let Ok(messages) = Message::list_from_json(data) {
        for message in &messages {
            let _ = message.canonical_bytes();
            if let Some(attachment) = &message.attachment {
                let _ = attachment.decode();
            }
        }
    }
});
