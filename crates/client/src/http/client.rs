//! API client core
//!
//! Owns the dispatch loop every request goes through: middleware pipeline,
//! transport send, cancellation race, status classification, and the
//! 401-refresh-replay path. Replay is bounded by an explicit attempt counter
//! on the descriptor; a request is replayed at most once per refresh, never
//! twice.

use std::sync::Arc;

use murmur_domain::types::common::ApiEnvelope;
use murmur_domain::{ApiError, ApiResult, ErrorBody};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::descriptor::RequestDescriptor;
use super::middleware::{BearerAuth, Middleware, RequestLogger, TraceHeaders};
use super::transport::Transport;
use crate::config::{ClientConfig, ConfigError};
use crate::notify::{NoopSink, NoticeKind, NotificationSink};
use crate::session::coordinator::HttpAuthExchange;
use crate::session::{AuthExchange, CredentialStore, InMemoryCredentialStore, LogoutHook, SessionCoordinator};

/// Hard ceiling on 401-triggered replays per request
const MAX_AUTH_REPLAYS: u32 = 1;

/// API client with middleware, error normalization and auth recovery
///
/// Cheap to share behind an [`Arc`]; every service wrapper holds one.
pub struct ApiClient {
    transport: Arc<Transport>,
    middleware: Vec<Arc<dyn Middleware>>,
    session: Arc<SessionCoordinator>,
    notifier: Arc<dyn NotificationSink>,
}

impl ApiClient {
    /// Create a client over the given configuration with default
    /// collaborators (in-memory credential store, silent notification sink)
    ///
    /// # Errors
    /// Returns an error if the configuration fails validation or the
    /// underlying HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Handle to the session coordinator (login installs, logout clears)
    pub fn session(&self) -> Arc<SessionCoordinator> {
        Arc::clone(&self.session)
    }

    /// Execute a GET request
    ///
    /// # Errors
    /// Returns a classified [`ApiError`] on any failure.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(RequestDescriptor::get(path)).await
    }

    /// Execute a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> ApiResult<T> {
        self.send(RequestDescriptor::builder(Method::GET, path).query_pairs(query).build()).await
    }

    /// Execute a POST request with a JSON body
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(RequestDescriptor::builder(Method::POST, path).json(body)?.build()).await
    }

    /// Execute a POST request with a JSON body, ignoring the payload
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<()> {
        self.send_unit(RequestDescriptor::builder(Method::POST, path).json(body)?.build()).await
    }

    /// Execute a bodyless POST request (follow, like, mark-read)
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(RequestDescriptor::builder(Method::POST, path).build()).await
    }

    /// Execute a bodyless POST request, ignoring the payload
    pub async fn post_empty_unit(&self, path: &str) -> ApiResult<()> {
        self.send_unit(RequestDescriptor::builder(Method::POST, path).build()).await
    }

    /// Execute a PUT request with a JSON body
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(RequestDescriptor::builder(Method::PUT, path).json(body)?.build()).await
    }

    /// Execute a PATCH request with a JSON body
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send(RequestDescriptor::builder(Method::PATCH, path).json(body)?.build()).await
    }

    /// Execute a bodyless PUT request, ignoring the payload (mark-read)
    pub async fn put_empty_unit(&self, path: &str) -> ApiResult<()> {
        self.send_unit(RequestDescriptor::builder(Method::PUT, path).build()).await
    }

    /// Execute a DELETE request, ignoring the payload
    pub async fn delete_unit(&self, path: &str) -> ApiResult<()> {
        self.send_unit(RequestDescriptor::builder(Method::DELETE, path).build()).await
    }

    /// Execute a DELETE request and deserialize the payload (unlike)
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(RequestDescriptor::builder(Method::DELETE, path).build()).await
    }

    /// Dispatch a descriptor and deserialize the envelope's payload
    ///
    /// # Errors
    /// `Unknown` if the envelope carried no data; otherwise any classified
    /// failure from the dispatch.
    pub async fn send<T: DeserializeOwned>(&self, request: RequestDescriptor) -> ApiResult<T> {
        self.send_envelope::<T>(request).await?.into_data().ok_or_else(|| ApiError::Unknown {
            message: "response envelope carried no data".to_string(),
        })
    }

    /// Dispatch a descriptor, tolerating an empty envelope
    pub async fn send_unit(&self, request: RequestDescriptor) -> ApiResult<()> {
        self.send_envelope::<serde_json::Value>(request).await.map(|_| ())
    }

    /// Dispatch a descriptor and parse the response envelope
    async fn send_envelope<T: DeserializeOwned>(
        &self,
        request: RequestDescriptor,
    ) -> ApiResult<ApiEnvelope<T>> {
        let response = self.dispatch(request).await?;
        let status = response.status();

        // No-body statuses deserialize as an empty successful envelope.
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Ok(ApiEnvelope { success: true, data: None, message: None, meta: None });
        }

        response.json::<ApiEnvelope<T>>().await.map_err(|e| ApiError::Unknown {
            message: format!("failed to parse response envelope: {e}"),
        })
    }

    /// The dispatch loop: middleware, send, classify, recover
    ///
    /// Returns the raw response for successful statuses; everything else is
    /// classified into the taxonomy. 401 responses route through the refresh
    /// coordinator once, then replay; a second 401 surfaces as
    /// `SessionExpired`.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub(crate) async fn dispatch(&self, mut request: RequestDescriptor) -> ApiResult<Response> {
        loop {
            // Middleware mutates a staged copy so a replay starts from the
            // pristine descriptor (fresh trace headers, fresh token).
            let mut staged = request.clone();
            for middleware in &self.middleware {
                middleware.before_send(&mut staged).await?;
            }

            let result = match staged.cancel.clone() {
                Some(token) => {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => Err(ApiError::Cancelled),
                        result = self.transport.execute(&staged) => result,
                    }
                }
                None => self.transport.execute(&staged).await,
            };

            let response = match result {
                Ok(response) => response,
                Err(err) => {
                    self.report_failure(&err);
                    return Err(err);
                }
            };

            let status = response.status();
            for middleware in &self.middleware {
                middleware.after_receive(&staged, status).await;
            }

            if status == StatusCode::UNAUTHORIZED {
                if request.attempt >= MAX_AUTH_REPLAYS {
                    warn!(path = %request.path, "401 after replay, giving up");
                    return Err(ApiError::SessionExpired);
                }

                // Single-flight: concurrent 401s converge on one exchange.
                // A failed refresh surfaces SessionExpired; the coordinator
                // already cleared the session and signalled logout.
                self.session.refresh_access_token().await?;
                request.attempt += 1;
                debug!(path = %request.path, attempt = request.attempt, "replaying with refreshed token");
                continue;
            }

            if !status.is_success() {
                let err = classify_status(status, response).await;
                self.report_failure(&err);
                return Err(err);
            }

            return Ok(response);
        }
    }

    /// Emit the single user-visible notice a failure warrants
    fn report_failure(&self, err: &ApiError) {
        match err {
            ApiError::NetworkUnavailable { .. } => {
                self.notifier.notify(
                    NoticeKind::Error,
                    "Network connection failed. Check your connection and try again.",
                );
            }
            ApiError::Server { .. } => {
                self.notifier.notify(NoticeKind::Error, "Server error. Please try again later.");
            }
            // SessionExpired is announced by the coordinator (once per
            // refresh failure, not per waiting request); cancellations and
            // client errors are the caller's to present.
            _ => {}
        }
    }
}

/// Classify a non-success status into the taxonomy
async fn classify_status(status: StatusCode, response: Response) -> ApiError {
    let body: ErrorBody = response.json().await.unwrap_or_default();

    if status.is_server_error() {
        return ApiError::Server {
            status: status.as_u16(),
            message: body.message.unwrap_or_else(|| "internal server error".to_string()),
        };
    }

    ApiError::from_error_body(status.as_u16(), body)
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<Arc<dyn CredentialStore>>,
    notifier: Option<Arc<dyn NotificationSink>>,
    exchange: Option<Arc<dyn AuthExchange>>,
    logout_hook: Option<LogoutHook>,
    extra_middleware: Vec<Arc<dyn Middleware>>,
}

impl ApiClientBuilder {
    /// Use the given configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist credentials through the given store
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Surface user-visible notices through the given sink
    pub fn notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(sink);
        self
    }

    /// Override the refresh-token exchange (tests, alternative auth hosts)
    pub fn auth_exchange(mut self, exchange: Arc<dyn AuthExchange>) -> Self {
        self.exchange = Some(exchange);
        self
    }

    /// Invoke the given hook when an irrecoverable auth failure logs out
    pub fn logout_hook(mut self, hook: LogoutHook) -> Self {
        self.logout_hook = Some(hook);
        self
    }

    /// Append custom middleware after the standard pipeline
    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.extra_middleware.push(middleware);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns an error if the configuration fails validation or the
    /// underlying HTTP client cannot be constructed.
    pub fn build(self) -> Result<ApiClient, ConfigError> {
        let transport = Arc::new(Transport::new(&self.config)?);

        let notifier: Arc<dyn NotificationSink> =
            self.notifier.unwrap_or_else(|| Arc::new(NoopSink));
        let store: Arc<dyn CredentialStore> =
            self.store.unwrap_or_else(|| Arc::new(InMemoryCredentialStore::new()));
        let exchange: Arc<dyn AuthExchange> = self
            .exchange
            .unwrap_or_else(|| Arc::new(HttpAuthExchange::new(Arc::clone(&transport))));

        let session = Arc::new(SessionCoordinator::new(
            store,
            exchange,
            Arc::clone(&notifier),
            self.logout_hook,
        ));

        // Standard pipeline order: token first, then trace headers, then
        // the logger so it sees the final descriptor.
        let mut middleware: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(BearerAuth::new(Arc::clone(&session))),
            Arc::new(TraceHeaders),
            Arc::new(RequestLogger::new(self.config.log_bodies)),
        ];
        middleware.extend(self.extra_middleware);

        Ok(ApiClient { transport, middleware, session, notifier })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client construction; request behavior is covered by
    //! the wiremock integration tests.
    use super::*;

    /// Validates the default build wires the standard pipeline.
    #[test]
    fn test_builder_defaults() {
        let client = ApiClient::builder().build().unwrap();
        let names: Vec<&str> = client.middleware.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["bearer-auth", "trace-headers", "request-logger"]);
    }

    /// Validates an invalid configuration fails construction.
    #[test]
    fn test_invalid_config_rejected() {
        let result = ApiClient::builder()
            .config(ClientConfig { base_url: "::not-a-url::".into(), ..ClientConfig::default() })
            .build();
        assert!(result.is_err());
    }
}
