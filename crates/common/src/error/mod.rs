//! Error classification primitives shared by every Murmur error type.
//!
//! Module-specific error enums stay where their domain lives; what they share
//! is the ability to answer the questions retry and reporting code asks:
//! is this worth retrying, and how loudly should it be surfaced. Implementing
//! [`ErrorClassification`] keeps that logic in one place per error type
//! instead of scattered through call sites.

use std::fmt;
use std::time::Duration;

/// Error classification trait for consistent handling across modules.
///
/// Retry wrappers consult [`is_retryable`](Self::is_retryable) before
/// re-attempting an operation; reporting surfaces use
/// [`severity`](Self::severity) to decide between a log line and a
/// user-visible notice.
pub trait ErrorClassification {
    /// Check if this error is transient and worth retrying.
    fn is_retryable(&self) -> bool;

    /// Get the severity level for monitoring and reporting decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Get the suggested retry delay if one is known (e.g. from a
    /// `Retry-After` header). `None` means no specific delay is suggested.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for monitoring and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically expected conditions (cache miss, not found)
    Info,
    /// Degraded but operational (transient network trouble, lock contention)
    Warning,
    /// Failure requiring attention
    Error,
    /// System integrity at risk, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for error classification primitives.
    use super::*;

    struct Flaky;

    impl ErrorClassification for Flaky {
        fn is_retryable(&self) -> bool {
            true
        }

        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Warning
        }
    }

    /// Validates `ErrorSeverity` ordering used by alerting thresholds.
    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Error > ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
    }

    /// Validates `ErrorSeverity` display formatting.
    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Info.to_string(), "INFO");
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
        assert_eq!(ErrorSeverity::Error.to_string(), "ERROR");
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }

    /// Validates the default `retry_after` implementation returns `None`.
    #[test]
    fn test_retry_after_default() {
        assert!(Flaky.is_retryable());
        assert_eq!(Flaky.retry_after(), None);
    }
}
