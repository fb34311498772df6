//! Shared helpers for the wiremock-backed integration tests.
// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use murmur_client::{
    ApiClient, ClientConfig, LogoutHook, NoticeKind, NotificationSink,
};
use serde_json::{json, Value};

/// Notification sink that records every notice for assertions.
#[derive(Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingSink {
    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices.lock().unwrap().push((kind, message.to_string()));
    }
}

/// Route client-layer traces to the test output once per process.
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_env_filter("murmur_client=debug").try_init();
    });
}

/// Build a client against the given mock server with a recording sink and a
/// counting logout hook.
pub fn build_client(
    base_url: &str,
    sink: Arc<RecordingSink>,
    logouts: Arc<AtomicU32>,
) -> Arc<ApiClient> {
    init_tracing();

    let config = ClientConfig::builder()
        .base_url(base_url)
        .timeout(Duration::from_secs(5))
        .build()
        .expect("valid test config");

    let hook: LogoutHook = Arc::new(move || {
        logouts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });

    Arc::new(
        ApiClient::builder()
            .config(config)
            .notification_sink(sink)
            .logout_hook(hook)
            .build()
            .expect("client builds"),
    )
}

/// A full user object as the backend serializes it.
pub fn sample_user() -> Value {
    json!({
        "id": "6f2a3bd4-9c1e-4a7f-8a70-5a3c8d2f1e90",
        "username": "alice",
        "email": "alice@example.com",
        "first_name": "Alice",
        "last_name": "Anders",
        "avatar": null,
        "is_verified": true,
        "is_active": true,
        "date_joined": "2024-03-01T12:00:00Z",
        "last_login": null,
        "followers_count": 10,
        "following_count": 4,
        "posts_count": 7,
        "is_following": null,
        "is_followed_by": null
    })
}

/// A full post object as the backend serializes it.
pub fn sample_post(id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "author": sample_user(),
        "content": content,
        "media_files": [],
        "hashtags": [],
        "likes_count": 0,
        "comments_count": 0,
        "reposts_count": 0,
        "is_liked": false,
        "is_reposted": false,
        "is_bookmarked": false,
        "status": "published",
        "visibility": "public",
        "is_edited": false,
        "created_at": "2024-03-02T08:30:00Z",
        "updated_at": "2024-03-02T08:30:00Z"
    })
}

/// A one-page paginated envelope payload.
pub fn paginated(results: Vec<Value>) -> Value {
    let total = results.len();
    json!({
        "results": results,
        "total": total,
        "page": 1,
        "page_size": 20,
        "total_pages": 1,
        "has_next": false,
        "has_previous": false
    })
}

/// Wrap a payload in the standard response envelope.
pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data, "message": null, "meta": null })
}
