//! Error taxonomy for the Murmur client layer
//!
//! Every transport, server or protocol failure is classified into exactly
//! one [`ApiError`] variant at the HTTP client boundary; callers never see a
//! raw transport error. Records are immutable after creation and cheap to
//! clone so a single outcome can fan out to multiple waiters.

use std::time::Duration;

use murmur_common::{ErrorClassification, ErrorSeverity};
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client-layer operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Classified failure produced at the HTTP client boundary
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The transport exceeded the per-request deadline
    #[error("request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// No response reached the client (DNS, connect, reset)
    #[error("network unavailable: {message}")]
    NetworkUnavailable { message: String },

    /// The server answered with a status of 500 or above
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server rejected the request with a 4xx status
    ///
    /// `code` is the server's machine-readable error code when supplied,
    /// `HTTP_<status>` otherwise. `details` carries field-level validation
    /// errors verbatim when the server provides them.
    #[error("client error ({status}) {code}: {message}")]
    Client { status: u16, code: String, message: String, details: Option<serde_json::Value> },

    /// Authentication could not be recovered; the session was cleared
    #[error("session expired, please sign in again")]
    SessionExpired,

    /// The caller cancelled the request before it settled
    ///
    /// Distinct from failure so callers don't surface a cancellation the
    /// user initiated as an error toast.
    #[error("request cancelled")]
    Cancelled,

    /// Unclassified failure
    #[error("unexpected error: {message}")]
    Unknown { message: String },
}

impl ApiError {
    /// Stable machine-readable code for logging and assertions
    pub fn code(&self) -> &str {
        match self {
            Self::Timeout { .. } => "TIMEOUT",
            Self::NetworkUnavailable { .. } => "NETWORK_ERROR",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Client { code, .. } => code,
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown { .. } => "UNKNOWN_ERROR",
        }
    }

    /// Create a `Client` error from a status code and a parsed error body
    pub fn from_error_body(status: u16, body: ErrorBody) -> Self {
        Self::Client {
            status,
            code: body.code.unwrap_or_else(|| format!("HTTP_{status}")),
            message: body.message.unwrap_or_else(|| format!("request failed with status {status}")),
            details: body.errors.or(body.details),
        }
    }
}

impl ErrorClassification for ApiError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::NetworkUnavailable { .. } | Self::Server { .. }
        )
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Timeout { .. } | Self::NetworkUnavailable { .. } => ErrorSeverity::Warning,
            Self::Server { .. } | Self::Client { .. } | Self::Unknown { .. } => ErrorSeverity::Error,
            Self::SessionExpired => ErrorSeverity::Warning,
            Self::Cancelled => ErrorSeverity::Info,
        }
    }
}

/// Error payload shape the Murmur backend returns on failure responses
///
/// All fields are optional; whatever is missing falls back to an
/// HTTP-status-derived default during classification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    /// Field-level validation errors, e.g. `{"email": ["already taken"]}`
    pub errors: Option<serde_json::Value>,
    pub details: Option<serde_json::Value>,
}
