//! User-facing notification surface
//!
//! The client layer never renders anything itself; failures that warrant a
//! user-visible notice are pushed through [`NotificationSink`], which the
//! embedding application implements (toast, banner, log line). One notice is
//! emitted per failure occurrence; deduplication is the sink's business if
//! it wants any.

use std::fmt;

/// Category of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Black-box notification surface supplied by the embedding application
pub trait NotificationSink: Send + Sync {
    /// Surface a notice to the user
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Sink that drops every notice; the default for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&self, _kind: NoticeKind, _message: &str) {}
}
