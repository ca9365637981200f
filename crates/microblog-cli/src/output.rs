//! Command output formats.

use std::path::Path;

use microblog_client::VerifiedMessage;
use microblog_proto::MessageId;

/// Marker placed before an attachment in listings.
pub const ATTACHMENT_MARKER: &str = "📎";

/// One listing line for a verified message.
///
/// ```text
/// {"message-id": 3, "date": "...", "author": "...", "message": "...", "attachment": "📎 <base64>", "signature": "..."}
/// ```
///
/// The attachment entry is present only for a non-empty attachment.
pub fn message_line(message: &VerifiedMessage) -> String {
    let mut line = format!(
        "{{\"message-id\": {}, \"date\": {}, \"author\": {}, \"message\": {}",
        message.id(),
        quote(&message.date),
        quote(&message.author),
        quote(&message.text),
    );

    if let Some(attachment) = message.attachment.as_ref().filter(|a| !a.is_empty()) {
        line.push_str(&format!(
            ", \"attachment\": {}",
            quote(&format!("{ATTACHMENT_MARKER} {}", attachment.as_str()))
        ));
    }

    let signature = message.signature.as_deref().unwrap_or_default();
    line.push_str(&format!(", \"signature\": {}}}", quote(signature)));
    line
}

/// Reply to a successful `post`.
pub fn posted_line(id: MessageId) -> String {
    format!("{{\"message-id\": {id}}}")
}

/// Reply to a successful `create`.
pub const WELCOME_LINE: &str = "{ message: \"welcome\" }";

/// Notice when an existing attachment file was kept.
pub fn kept_file_line(path: &Path) -> String {
    format!("File {} not overwritten. Operation cancelled by the user.", path.display())
}

fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
