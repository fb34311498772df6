//! Generic retry strategy with exponential backoff
//!
//! Provides a retry mechanism for any fallible async operation. Callers opt
//! in per call site; nothing in the request path retries implicitly. The
//! executor surfaces the final attempt's error unchanged, so callers keep
//! their own error type end to end.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide whether the error is worth another attempt, optionally with a
    /// custom delay
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the configured backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: `base_delay * 2^attempt`, capped at `max_delay`
    Exponential { base_delay: Duration, max_delay: Duration },
}

impl BackoffStrategy {
    /// Calculate the delay before the attempt following `attempt` (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Exponential { base_delay, max_delay } => {
                let shift = attempt.min(31);
                let multiplier = 1u64 << shift;
                base_delay.saturating_mul(multiplier as u32).min(*max_delay)
            }
        }
    }
}

/// Jitter type for randomizing retry delays
///
/// The plain [`retry_with_backoff`] helper never applies jitter; executors
/// built from a config may opt in to spread synchronized retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// No jitter
    #[default]
    None,
    /// Full jitter: uniform in `[0, calculated_delay]`
    Full,
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            Self::None => delay,
            Self::Full => {
                let max = delay.as_millis() as u64;
                Duration::from_millis(pseudo_random(max))
            }
        }
    }
}

/// Timing-seeded LCG, good enough distribution for jitter without pulling in
/// a random number generator.
fn pseudo_random(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let nanos = u64::from(Instant::now().elapsed().subsec_nanos());
    let mut seed = nanos.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    seed % max
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of additional attempts after the initial one
    pub max_retries: u32,
    /// Backoff strategy for calculating delays
    pub backoff: BackoffStrategy,
    /// Jitter applied to calculated delays
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffStrategy::Exponential {
                base_delay: Duration::from_millis(1000),
                max_delay: Duration::from_secs(30),
            },
            jitter: Jitter::None,
        }
    }
}

impl RetryConfig {
    /// Create a configuration builder
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let BackoffStrategy::Exponential { base_delay, max_delay } = &self.backoff {
            if max_delay < base_delay {
                return Err("max_delay must not be smaller than base_delay".to_string());
            }
        }
        Ok(())
    }
}

/// Builder for [`RetryConfig`] with a fluent API
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed(delay);
        self
    }

    pub fn exponential_backoff(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Exponential { base_delay, max_delay };
        self
    }

    pub fn full_jitter(mut self) -> Self {
        self.config.jitter = Jitter::Full;
        self
    }

    pub fn build(self) -> Result<RetryConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// The retry executor
///
/// Runs an operation up to `1 + max_retries` times, sleeping between
/// attempts according to the backoff strategy. The final failure is returned
/// to the caller exactly as the operation produced it.
pub struct RetryExecutor<P> {
    config: RetryConfig,
    policy: P,
}

impl<P> RetryExecutor<P> {
    /// Create a new retry executor with the given configuration and policy
    pub fn new(config: RetryConfig, policy: P) -> Self {
        Self { config, policy }
    }

    /// Create with default configuration
    pub fn with_policy(policy: P) -> Self {
        Self::new(RetryConfig::default(), policy)
    }

    /// Execute an operation with retry logic
    ///
    /// # Errors
    /// Returns the last attempt's error unchanged once retries are exhausted
    /// or the policy declines to continue.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        P: RetryPolicy<E>,
        E: fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt: u32 = 0;

        loop {
            debug!(attempt = attempt + 1, max_retries = self.config.max_retries, "executing operation");

            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if attempt >= self.config.max_retries {
                        warn!(
                            attempts = attempt + 1,
                            error = ?error,
                            "retry attempts exhausted"
                        );
                        return Err(error);
                    }

                    let delay = match self.policy.should_retry(&error, attempt) {
                        RetryDecision::Stop => {
                            debug!(error = ?error, "retry policy declined to continue");
                            return Err(error);
                        }
                        RetryDecision::Retry => {
                            self.config.jitter.apply(self.config.backoff.calculate_delay(attempt))
                        }
                        RetryDecision::RetryAfter(custom) => custom,
                    };

                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "operation failed, retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Retry an operation with plain exponential backoff and no jitter
///
/// Delay before attempt `k + 1` is `base_delay * 2^k`. After `max_retries`
/// additional attempts the last error is surfaced unchanged.
///
/// # Errors
/// Returns the final attempt's error.
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Debug,
{
    let config = RetryConfig {
        max_retries,
        backoff: BackoffStrategy::Exponential { base_delay, max_delay: Duration::MAX },
        jitter: Jitter::None,
    };
    RetryExecutor::new(config, policies::AlwaysRetry).execute(operation).await
}

/// Pre-defined retry policies for common scenarios
pub mod policies {
    use super::{RetryDecision, RetryPolicy};

    /// Always retry policy - retries on any error
    #[derive(Debug, Clone, Copy)]
    pub struct AlwaysRetry;

    impl<E> RetryPolicy<E> for AlwaysRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Retry
        }
    }

    /// Never retry policy - stops on the first error
    #[derive(Debug, Clone, Copy)]
    pub struct NeverRetry;

    impl<E> RetryPolicy<E> for NeverRetry {
        fn should_retry(&self, _error: &E, _attempt: u32) -> RetryDecision {
            RetryDecision::Stop
        }
    }

    /// Predicate-based retry policy
    #[derive(Debug)]
    pub struct PredicateRetry<F> {
        predicate: F,
    }

    impl<F> PredicateRetry<F> {
        pub fn new(predicate: F) -> Self {
            Self { predicate }
        }
    }

    impl<F, E> RetryPolicy<E> for PredicateRetry<F>
    where
        F: Fn(&E, u32) -> bool,
    {
        fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
            if (self.predicate)(error, attempt) {
                RetryDecision::Retry
            } else {
                RetryDecision::Stop
            }
        }
    }
}
