//! Request middleware pipeline
//!
//! An explicit, ordered list of middleware runs before every send. Each
//! middleware may mutate the staged descriptor (headers) or short-circuit
//! the dispatch by returning an error; after the response arrives each gets
//! an observation callback. The standard pipeline is bearer-token injection,
//! trace headers, then the debug logger.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use murmur_domain::ApiResult;
use rand::Rng;
use reqwest::StatusCode;
use tracing::debug;

use super::descriptor::RequestDescriptor;
use crate::session::SessionCoordinator;

/// Hook applied around every dispatched request
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Runs before the request is sent; may mutate headers or short-circuit
    /// the dispatch by returning an error
    async fn before_send(&self, request: &mut RequestDescriptor) -> ApiResult<()> {
        let _ = request;
        Ok(())
    }

    /// Observes the response status once one arrives; classification itself
    /// happens in the dispatch loop
    async fn after_receive(&self, request: &RequestDescriptor, status: StatusCode) {
        let _ = (request, status);
    }
}

/// Attaches `Authorization: Bearer <token>` when a session exists
pub struct BearerAuth {
    session: Arc<SessionCoordinator>,
}

impl BearerAuth {
    pub fn new(session: Arc<SessionCoordinator>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Middleware for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer-auth"
    }

    async fn before_send(&self, request: &mut RequestDescriptor) -> ApiResult<()> {
        if let Some(token) = self.session.access_token().await {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
        Ok(())
    }
}

/// Attaches the `X-Request-ID` and `X-Timestamp` trace headers
///
/// Request ids have the shape `req_<unix millis>_<9 base36 chars>` so server
/// logs can be correlated with client traces.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceHeaders;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub(crate) fn generate_request_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String =
        (0..9).map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())])).collect();
    format!("req_{}_{}", Utc::now().timestamp_millis(), suffix)
}

#[async_trait]
impl Middleware for TraceHeaders {
    fn name(&self) -> &'static str {
        "trace-headers"
    }

    async fn before_send(&self, request: &mut RequestDescriptor) -> ApiResult<()> {
        request.set_header("X-Request-ID", generate_request_id());
        request.set_header("X-Timestamp", Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        Ok(())
    }
}

/// Logs requests and responses at debug level
///
/// Bodies are included only when the client is configured for body logging;
/// production builds keep payloads out of the logs.
#[derive(Debug, Clone, Copy)]
pub struct RequestLogger {
    log_bodies: bool,
}

impl RequestLogger {
    pub fn new(log_bodies: bool) -> Self {
        Self { log_bodies }
    }
}

#[async_trait]
impl Middleware for RequestLogger {
    fn name(&self) -> &'static str {
        "request-logger"
    }

    async fn before_send(&self, request: &mut RequestDescriptor) -> ApiResult<()> {
        if self.log_bodies {
            debug!(
                method = %request.method,
                path = %request.path,
                body = ?request.body,
                attempt = request.attempt,
                "sending API request"
            );
        } else {
            debug!(
                method = %request.method,
                path = %request.path,
                attempt = request.attempt,
                "sending API request"
            );
        }
        Ok(())
    }

    async fn after_receive(&self, request: &RequestDescriptor, status: StatusCode) {
        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "received API response"
        );
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the middleware pipeline.
    use reqwest::Method;

    use super::*;

    /// Validates request ids match `req_<millis>_<9 base36 chars>`.
    #[test]
    fn test_request_id_shape() {
        let id = generate_request_id();
        let parts: Vec<&str> = id.splitn(3, '_').collect();

        assert_eq!(parts[0], "req");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    /// Validates consecutive ids differ.
    #[test]
    fn test_request_ids_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }

    /// Validates trace headers land on the staged descriptor.
    #[tokio::test]
    async fn test_trace_headers_applied() {
        let mut request = RequestDescriptor::builder(Method::GET, "/posts").build();

        TraceHeaders.before_send(&mut request).await.unwrap();

        let names: Vec<&str> = request.headers.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"X-Request-ID"));
        assert!(names.contains(&"X-Timestamp"));
    }
}
