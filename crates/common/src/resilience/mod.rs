//! Resilience patterns for fault-tolerant request handling
//!
//! This module provides generic, reusable building blocks:
//! - **Retry**: configurable retry strategies with exponential backoff
//! - **Concurrency limiter**: bounds simultaneous in-flight operations with a
//!   FIFO queue for the overflow
//! - **Clock abstraction**: lets time-dependent code run against a
//!   deterministic [`MockClock`] in tests
//!
//! Both patterns are opt-in wrappers; the request path composes them per call
//! site rather than applying them globally.

pub mod clock;
pub mod limiter;
pub mod retry;

// Re-export clock types
pub use clock::{Clock, MockClock, SystemClock};
// Re-export limiter types
pub use limiter::{ConcurrencyLimiter, LimiterConfig, LimiterConfigBuilder, LimiterMetrics};
// Re-export retry types
pub use retry::{
    policies, retry_with_backoff, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder,
    RetryDecision, RetryExecutor, RetryPolicy,
};
