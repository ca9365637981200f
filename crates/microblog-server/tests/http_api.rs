//! HTTP contract of the feed store
//!
//! Each test serves the router on an ephemeral port. Status codes and bodies
//! are checked with a raw HTTP client, then the client's HTTP feed store
//! publishes to and walks a redb-backed server.

use std::{sync::Arc, time::Duration};

use microblog_client::{
    FeedReader, FeedStore, FixedEnv, Identity, Keyring, Publisher, Verifier, WalkRequest,
    store::HttpFeedStore,
};
use microblog_crypto::{generate_signing_key, sign};
use microblog_proto::{Message, MessageId};
use microblog_server::{
    ENVELOPE_HEADROOM, FeedService, MemoryStorage, RedbStorage, Server, router,
};
use reqwest::{Client, StatusCode};

fn signed(text: &str) -> Message {
    let key = generate_signing_key([1; 32]);
    let mut message = Message::new("2024-01-01T00:00:00Z", "alice", text, None);
    message.signature = Some(sign(&message.canonical_bytes().unwrap(), &key));
    message
}

/// Serve a fresh in-memory feed on an ephemeral port and return its URL.
async fn spawn_app() -> String {
    let app = router(Arc::new(FeedService::new(MemoryStorage::new())));
    let server = Server::bind_router("127.0.0.1:0", app).await.unwrap();
    let url = format!("http://{}/messages", server.local_addr().unwrap());
    tokio::spawn(server.run());
    url
}

async fn post_body(url: &str, body: impl Into<reqwest::Body>) -> (StatusCode, Vec<u8>) {
    let response = Client::new()
        .post(url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.bytes().await.unwrap().to_vec())
}

async fn post(url: &str, message: &Message) -> (StatusCode, Vec<u8>) {
    post_body(url, message.to_json().unwrap()).await
}

async fn get(url: &str, query: &str) -> (StatusCode, Vec<u8>) {
    let response = Client::new().get(format!("{url}{query}")).send().await.unwrap();
    let status = response.status();
    (status, response.bytes().await.unwrap().to_vec())
}

async fn get_ids(url: &str, query: &str) -> Vec<MessageId> {
    let (status, body) = get(url, query).await;
    assert_eq!(status, StatusCode::OK);
    Message::list_from_json(&body).unwrap().iter().filter_map(|m| m.id).collect()
}

#[tokio::test]
async fn post_assigns_ids_from_one() {
    let url = spawn_app().await;

    for expected in 1..=3 {
        let (status, body) = post(&url, &signed("hi")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(Message::from_json(&body).unwrap().id, Some(expected));
    }
}

#[tokio::test]
async fn listing_and_paging() {
    let url = spawn_app().await;
    for i in 0..5 {
        post(&url, &signed(&format!("m{i}"))).await;
    }

    assert_eq!(get_ids(&url, "").await, [5, 4, 3, 2, 1]);
    assert_eq!(get_ids(&url, "?count=2").await, [5, 4]);
    assert_eq!(get_ids(&url, "?limit=2&next=3").await, [3, 2]);
    assert_eq!(get_ids(&url, "?limit=2").await, [5, 4]);
    assert!(get_ids(&url, "?limit=2&next=0").await.is_empty());
}

#[tokio::test]
async fn oversized_body_is_413() {
    let service = FeedService::new(MemoryStorage::new()).with_max_attachment_len(16);
    let server = Server::bind_router("127.0.0.1:0", router(Arc::new(service))).await.unwrap();
    let url = format!("http://{}/messages", server.local_addr().unwrap());
    tokio::spawn(server.run());

    let body = vec![b' '; 16 + ENVELOPE_HEADROOM + 1];
    assert_eq!(post_body(&url, body).await.0, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn bad_requests_are_400() {
    let url = spawn_app().await;

    assert_eq!(post_body(&url, "not json").await.0, StatusCode::BAD_REQUEST);

    let mut unsigned = signed("hi");
    unsigned.signature = None;
    assert_eq!(post(&url, &unsigned).await.0, StatusCode::BAD_REQUEST);

    let mut with_id = signed("hi");
    with_id.id = Some(9);
    assert_eq!(post(&url, &with_id).await.0, StatusCode::BAD_REQUEST);

    assert_eq!(get(&url, "?count=1&limit=1").await.0, StatusCode::BAD_REQUEST);
    assert_eq!(get(&url, "?count=-1").await.0, StatusCode::BAD_REQUEST);

    assert!(get_ids(&url, "").await.is_empty());
}

#[test]
fn client_walks_real_server() {
    let dir = tempfile::tempdir().unwrap();
    let storage = RedbStorage::open(dir.path().join("feed.redb")).unwrap();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime
        .block_on(Server::bind_router(
            "127.0.0.1:0",
            router(Arc::new(FeedService::new(storage))),
        ))
        .unwrap();
    let url = format!("http://{}", server.local_addr().unwrap());
    runtime.spawn(server.run());

    let alice = Identity::from_signing_key("alice", generate_signing_key([2; 32])).unwrap();
    let store = HttpFeedStore::new(&url, Duration::from_secs(5)).unwrap();
    let env = FixedEnv::with_seed(0);
    let publisher = Publisher::new(&alice, &store, &env);
    for i in 1..=5 {
        let stored = publisher.publish(&format!("post {i}"), None).unwrap();
        assert_eq!(stored.id, Some(i));
    }

    let reader =
        FeedReader::new(&store, Verifier::new(Keyring::with_identity(&alice))).with_page_cap(2);
    let messages = reader.collect(WalkRequest { start: Some(4), count: 3 }).unwrap();
    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["post 4", "post 3", "post 2"]);

    assert_eq!(store.latest(1).unwrap()[0].id, Some(5));
}

#[test]
fn large_attachment_round_trips_over_http() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime
        .block_on(Server::bind_router(
            "127.0.0.1:0",
            router(Arc::new(FeedService::new(MemoryStorage::new()))),
        ))
        .unwrap();
    let url = format!("http://{}", server.local_addr().unwrap());
    runtime.spawn(server.run());

    // Encodes to about 8 MiB, well past axum's default body limit.
    let payload: Vec<u8> = (0..6 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.bin");
    std::fs::write(&path, &payload).unwrap();

    let alice = Identity::from_signing_key("alice", generate_signing_key([3; 32])).unwrap();
    let store = HttpFeedStore::new(&url, Duration::from_secs(30)).unwrap();
    let env = FixedEnv::with_seed(0);
    let stored = Publisher::new(&alice, &store, &env).publish("big one", Some(&path)).unwrap();
    assert_eq!(stored.id, Some(1));

    let reader = FeedReader::new(&store, Verifier::new(Keyring::with_identity(&alice)));
    let messages = reader.collect(WalkRequest::latest(1)).unwrap();
    assert_eq!(messages.len(), 1);
    let attachment = messages[0].attachment.as_ref().unwrap();
    assert_eq!(attachment.decode().unwrap(), payload);
}
