//! HTTP routes for the feed store.
//!
//! - `POST /messages`: submit a signed message, echoes the stored message
//! - `GET /messages?count=N`: most recent messages, newest first
//! - `GET /messages?limit=N&next=ID`: a page below `next`, newest first

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use microblog_proto::Message;

use crate::{
    service::{FeedService, ListQuery, ServiceError},
    storage::Storage,
};

/// Room for the JSON envelope around the largest accepted attachment.
pub const ENVELOPE_HEADROOM: usize = 64 * 1024;

/// Create the Axum router serving `service`.
///
/// Request bodies are capped at the service's attachment bound plus
/// [`ENVELOPE_HEADROOM`], so every attachment the service accepts fits.
pub fn router<S: Storage>(service: Arc<FeedService<S>>) -> Router {
    let body_limit = service.max_attachment_len().saturating_add(ENVELOPE_HEADROOM);

    Router::new()
        .route("/messages", get(list_messages::<S>).post(post_message::<S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

async fn post_message<S: Storage>(
    State(service): State<Arc<FeedService<S>>>,
    body: Bytes,
) -> Result<Json<Message>, ServiceError> {
    let message = Message::from_json(&body).map_err(|e| ServiceError::Invalid(e.to_string()))?;
    service.submit(&message).map(Json)
}

async fn list_messages<S: Storage>(
    State(service): State<Arc<FeedService<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Message>>, ServiceError> {
    service.list(&query).map(Json)
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Invalid(reason) => {
                tracing::warn!(%reason, "rejected request");
                StatusCode::BAD_REQUEST
            },
            Self::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            },
        };
        (status, self.to_string()).into_response()
    }
}
