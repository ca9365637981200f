//! [`reqwest`]-backed implementation of [`FeedStore`].

use std::time::Duration;

use microblog_proto::{Message, MessageId};
use reqwest::{
    blocking::{Client, RequestBuilder},
    header::CONTENT_TYPE,
};

use super::FeedStore;
use crate::error::TransportError;

/// Longest response body kept in a `Status` error.
const MAX_ERROR_BODY: usize = 256;

/// Feed store reached over HTTP.
///
/// Every request is bounded by the client timeout.
#[derive(Debug, Clone)]
pub struct HttpFeedStore {
    client: Client,
    messages_url: String,
}

impl HttpFeedStore {
    /// Store at `base_url` (for example `http://127.0.0.1:8080`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let messages_url = format!("{}/messages", base_url.trim_end_matches('/'));
        Ok(Self { client, messages_url })
    }

    fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, TransportError> {
        let response = request.send().map_err(|e| TransportError::Unreachable(e.to_string()))?;
        let status = response.status();
        let body = response.bytes().map_err(|e| TransportError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            let mut body = String::from_utf8_lossy(&body).into_owned();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(TransportError::Status { status: status.as_u16(), body });
        }

        Ok(body.to_vec())
    }

    fn list(&self, query: &[(&str, String)]) -> Result<Vec<Message>, TransportError> {
        let body = self.send(self.client.get(&self.messages_url).query(query))?;
        Ok(Message::list_from_json(&body)?)
    }
}

impl FeedStore for HttpFeedStore {
    fn latest(&self, count: usize) -> Result<Vec<Message>, TransportError> {
        tracing::debug!(count, "GET latest");
        self.list(&[("count", count.to_string())])
    }

    fn page(&self, limit: usize, next: MessageId) -> Result<Vec<Message>, TransportError> {
        tracing::debug!(limit, next, "GET page");
        self.list(&[("limit", limit.to_string()), ("next", next.to_string())])
    }

    fn publish(&self, message: &Message) -> Result<Message, TransportError> {
        let body = message.to_json().map_err(|e| TransportError::Malformed(e.to_string()))?;
        let request = self
            .client
            .post(&self.messages_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let response = self.send(request)?;
        Ok(Message::from_json(&response)?)
    }
}
