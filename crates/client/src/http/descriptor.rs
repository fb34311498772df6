//! Request descriptor
//!
//! A dispatched request is described entirely by a [`RequestDescriptor`]:
//! method, relative path, query, headers, body, deadline and cancellation.
//! The descriptor is built once per call and treated as immutable by the
//! dispatch loop except for the explicit `attempt` counter, which replaces
//! the mutable retried-flag trick with a hard-ceiling check.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use murmur_domain::{ApiError, ApiResult};
use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_TIMEOUT;

/// Body attached to an outgoing request
#[derive(Clone, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON payload, serialized once at build time so replays reuse it
    Json(serde_json::Value),
    /// Multipart form of file parts; rebuilt from the raw bytes per attempt
    Multipart(Vec<FilePart>),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Json(value) => write!(f, "Json({value})"),
            Self::Multipart(parts) => write!(f, "Multipart({} parts)", parts.len()),
        }
    }
}

/// One file in a multipart upload
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl FilePart {
    pub fn new(filename: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self { filename: filename.into(), mime: mime.into(), bytes: bytes.into() }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Shareable progress callback reporting a 0–100 percentage
#[derive(Clone)]
pub struct ProgressHandler(Arc<dyn Fn(u8) + Send + Sync>);

impl ProgressHandler {
    pub fn new(callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    /// Report transfer progress as a percentage
    pub fn report(&self, percent: u8) {
        (self.0)(percent.min(100));
    }
}

impl fmt::Debug for ProgressHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressHandler(..)")
    }
}

/// Immutable description of one API request
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the configured base origin, e.g. `/users/me`
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Extra headers beyond the standard set; middleware appends here
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// Per-request deadline
    pub timeout: Duration,
    /// Replay counter maintained by the dispatch loop; requests start at 0
    /// and the loop enforces a hard ceiling before any replay path
    pub attempt: u32,
    /// Cooperative cancellation; when fired the request settles as
    /// `ApiError::Cancelled`
    pub cancel: Option<CancellationToken>,
    /// Upload progress callback, reported as the body streams out
    pub progress: Option<ProgressHandler>,
}

impl RequestDescriptor {
    /// Start building a request for the given method and relative path
    pub fn builder(method: Method, path: impl Into<String>) -> RequestDescriptorBuilder {
        RequestDescriptorBuilder {
            descriptor: RequestDescriptor {
                method,
                path: path.into(),
                query: Vec::new(),
                headers: Vec::new(),
                body: RequestBody::Empty,
                timeout: DEFAULT_TIMEOUT,
                attempt: 0,
                cancel: None,
                progress: None,
            },
        }
    }

    /// Convenience constructor for a bare GET
    pub fn get(path: impl Into<String>) -> Self {
        Self::builder(Method::GET, path).build()
    }

    /// Append or replace a header on the descriptor
    ///
    /// Used by middleware; the last writer for a name wins when the request
    /// is assembled.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }
}

/// Builder for [`RequestDescriptor`]
#[derive(Debug)]
pub struct RequestDescriptorBuilder {
    descriptor: RequestDescriptor,
}

impl RequestDescriptorBuilder {
    /// Add a single query pair
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.descriptor.query.push((name.into(), value.into()));
        self
    }

    /// Add several query pairs
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.descriptor.query.extend(pairs);
        self
    }

    /// Attach a JSON body
    ///
    /// # Errors
    /// Returns `ApiError::Unknown` if the value fails to serialize.
    pub fn json<B: Serialize>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Unknown {
            message: format!("failed to serialize request body: {e}"),
        })?;
        self.descriptor.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a multipart body
    pub fn multipart(mut self, parts: Vec<FilePart>) -> Self {
        self.descriptor.body = RequestBody::Multipart(parts);
        self
    }

    /// Override the per-request deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.descriptor.timeout = timeout;
        self
    }

    /// Attach a cancellation token
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.descriptor.cancel = Some(token);
        self
    }

    /// Attach an upload progress callback
    pub fn progress(mut self, handler: ProgressHandler) -> Self {
        self.descriptor.progress = Some(handler);
        self
    }

    /// Finish building the descriptor
    pub fn build(self) -> RequestDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the request descriptor.
    use super::*;

    /// Validates builder defaults: 30s deadline, attempt 0, empty body.
    #[test]
    fn test_builder_defaults() {
        let descriptor = RequestDescriptor::get("/users/me");

        assert_eq!(descriptor.method, Method::GET);
        assert_eq!(descriptor.path, "/users/me");
        assert_eq!(descriptor.timeout, Duration::from_secs(30));
        assert_eq!(descriptor.attempt, 0);
        assert!(matches!(descriptor.body, RequestBody::Empty));
        assert!(descriptor.cancel.is_none());
    }

    /// Validates a JSON body serializes once into the descriptor.
    #[test]
    fn test_json_body() {
        let descriptor = RequestDescriptor::builder(Method::POST, "/posts")
            .json(&serde_json::json!({ "content": "hello" }))
            .unwrap()
            .build();

        match descriptor.body {
            RequestBody::Json(value) => assert_eq!(value["content"], "hello"),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    /// Validates query pairs accumulate in order.
    #[test]
    fn test_query_pairs() {
        let descriptor = RequestDescriptor::builder(Method::GET, "/posts")
            .query("page", "2")
            .query("limit", "10")
            .build();

        assert_eq!(
            descriptor.query,
            vec![("page".to_string(), "2".to_string()), ("limit".to_string(), "10".to_string())]
        );
    }

    /// Validates progress handlers clamp to 100.
    #[test]
    fn test_progress_clamps() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = std::sync::Arc::clone(&seen);
        let handler = ProgressHandler::new(move |pct| seen_clone.lock().unwrap().push(pct));

        handler.report(50);
        handler.report(250);

        assert_eq!(*seen.lock().unwrap(), vec![50, 100]);
    }
}
