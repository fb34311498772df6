//! Typed endpoint services
//!
//! Thin, typed wrappers over [`ApiClient`](crate::ApiClient) mirroring the
//! Murmur REST surface. Every call goes through the dispatch pipeline, so
//! services inherit token injection, classification and auth recovery for
//! free. Read-heavy services share a response cache keyed by resource
//! prefix (`posts:`, `users:`); mutations invalidate their prefix.

pub mod auth;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod users;

use murmur_common::cache::Cache;
use murmur_domain::ApiResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, warn};

pub use auth::AuthService;
pub use messages::MessagesService;
pub use notifications::NotificationsService;
pub use posts::PostsService;
pub use users::UsersService;

/// Response cache shared by the read-heavy services
///
/// Values are stored as JSON so one cache serves every payload type; a hit
/// deserializes back into the caller's type.
pub type ResponseCache = Cache<serde_json::Value>;

/// Serve from cache or fetch and populate
///
/// A cached value that no longer deserializes (schema drift across
/// versions) is dropped and refetched rather than surfaced as an error.
pub(crate) async fn cached_fetch<T, F, Fut>(
    cache: &ResponseCache,
    key: &str,
    fetch: F,
) -> ApiResult<T>
where
    T: DeserializeOwned + Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    if let Some(value) = cache.get(key) {
        match serde_json::from_value::<T>(value) {
            Ok(hit) => {
                debug!(key, "response cache hit");
                return Ok(hit);
            }
            Err(e) => {
                warn!(key, error = %e, "stale cache shape, refetching");
                cache.remove(key);
            }
        }
    }

    let fresh = fetch().await?;
    match serde_json::to_value(&fresh) {
        Ok(value) => cache.insert(key.to_string(), value),
        Err(e) => {
            // Not fatal; the caller still gets the response.
            warn!(key, error = %e, "response not cacheable");
        }
    }
    Ok(fresh)
}
