//! Integration tests for the typed endpoint services
//!
//! Login installing the session, response caching with prefix
//! invalidation, multipart upload with progress, and streaming download.

mod support;

use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Mutex};

use murmur_client::{FilePart, Murmur, ProgressHandler};
use murmur_domain::types::auth::Credentials;
use murmur_domain::types::common::PageQuery;
use murmur_domain::types::post::CreatePost;
use serde_json::json;
use support::{build_client, envelope, paginated, sample_post, sample_user, RecordingSink};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn murmur_for(server: &MockServer) -> Murmur {
    let client = build_client(
        &server.uri(),
        Arc::new(RecordingSink::default()),
        Arc::new(AtomicU32::new(0)),
    );
    Murmur::with_client(client)
}

/// Login stores the issued token pair; the next call carries it.
#[tokio::test]
async fn login_installs_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "user": sample_user(),
            "access_token": "issued-access",
            "refresh_token": "issued-refresh",
            "expires_in": 900
        }))))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer issued-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(sample_user())))
        .expect(1)
        .mount(&server)
        .await;

    let murmur = murmur_for(&server);

    let payload = murmur.auth.login(&Credentials::new("alice", "hunter2")).await.unwrap();
    assert_eq!(payload.user.username, "alice");
    assert!(murmur.client().session().is_authenticated().await);

    let me = murmur.auth.me().await.unwrap();
    assert_eq!(me.username, "alice");
}

/// The feed is served from cache on the second read and refetched after a
/// mutation invalidates the `posts:` prefix.
#[tokio::test]
async fn feed_caches_and_mutations_invalidate() {
    let server = MockServer::start().await;

    let post_id = "4dd42a3c-7b1a-4a4e-9a70-1b2c3d4e5f60";
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(paginated(vec![sample_post(post_id, "first")]))),
        )
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(sample_post(post_id, "second"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let murmur = murmur_for(&server);

    // Two reads, one network call.
    let first = murmur.posts.feed(PageQuery::default()).await.unwrap();
    let second = murmur.posts.feed(PageQuery::default()).await.unwrap();
    assert_eq!(first.results[0].content, second.results[0].content);

    // A mutation clears the prefix; the next read goes to the network.
    murmur.posts.create(&CreatePost::text("second")).await.unwrap();
    let third = murmur.posts.feed(PageQuery::default()).await.unwrap();
    assert_eq!(third.results.len(), 1);
}

/// Avatar upload goes out as multipart with a `file` part and reports a
/// terminal 100% progress.
#[tokio::test]
async fn avatar_upload_is_multipart_with_progress() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/me/avatar"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!({ "avatar": "https://cdn.murmur.app/a.png" }))),
        )
        .mount(&server)
        .await;

    let murmur = murmur_for(&server);

    let reported: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let reported_clone = Arc::clone(&reported);
    let progress = ProgressHandler::new(move |pct| reported_clone.lock().unwrap().push(pct));

    let payload = murmur
        .users
        .upload_avatar(
            FilePart::new("avatar.png", "image/png", vec![7u8; 200_000]),
            Some(progress),
        )
        .await
        .unwrap();
    assert_eq!(payload.avatar, "https://cdn.murmur.app/a.png");

    let reported = reported.lock().unwrap();
    assert_eq!(*reported.last().unwrap(), 100);

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("Content-Type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"), "got {content_type}");

    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""), "single upload uses the `file` field");
    assert!(body.contains("filename=\"avatar.png\""));
}

/// A batch upload uses indexed `files[n]` fields.
#[tokio::test]
async fn batch_upload_uses_indexed_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/posts/upload-images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "count": 2 }))))
        .mount(&server)
        .await;

    let murmur = murmur_for(&server);

    let _: serde_json::Value = murmur
        .client()
        .upload_batch(
            "/posts/upload-images",
            vec![
                FilePart::new("one.png", "image/png", vec![1u8; 1024]),
                FilePart::new("two.png", "image/png", vec![2u8; 1024]),
            ],
            None,
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"files[0]\""));
    assert!(body.contains("name=\"files[1]\""));
}

/// Download streams the binary body to disk and reports completion.
#[tokio::test]
async fn download_writes_destination_file() {
    let server = MockServer::start().await;

    let payload: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
    Mock::given(method("GET"))
        .and(path("/settings/export-data"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .mount(&server)
        .await;

    let murmur = murmur_for(&server);

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("export.bin");

    let reported: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let reported_clone = Arc::clone(&reported);
    let progress = ProgressHandler::new(move |pct| reported_clone.lock().unwrap().push(pct));

    let written = murmur
        .client()
        .download("/settings/export-data", &destination, Some(progress))
        .await
        .unwrap();

    assert_eq!(written, payload.len() as u64);
    assert_eq!(std::fs::read(&destination).unwrap(), payload);
    assert_eq!(*reported.lock().unwrap().last().unwrap(), 100);
}

/// Paginated listings map the backend's pagination envelope.
#[tokio::test]
async fn notifications_list_maps_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notifications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "results": [{
                "id": "aa0e8b5c-2f6d-4f3a-9c1b-7d8e9f0a1b2c",
                "type": "follow",
                "title": "New follower",
                "message": "alice followed you",
                "status": "unread",
                "actor": sample_user(),
                "action_url": "/users/alice",
                "created_at": "2024-03-02T09:00:00Z",
                "read_at": null
            }],
            "total": 1,
            "page": 1,
            "page_size": 20,
            "total_pages": 1,
            "has_next": false,
            "has_previous": false
        }))))
        .mount(&server)
        .await;

    let murmur = murmur_for(&server);

    let page = murmur.notifications.list(PageQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.results[0].title, "New follower");
    assert!(!page.has_next);
}
