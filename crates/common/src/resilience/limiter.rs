//! FIFO concurrency limiter for bounding in-flight operations
//!
//! Bounds the number of operations executing at once. Submissions beyond the
//! limit wait in FIFO order for a slot; there is no rejection and no queue
//! bound. A failed operation releases its slot like any other and its error
//! passes through to the submitter unchanged, so one failure never stalls
//! the queue.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Configuration for the concurrency limiter
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    /// Maximum number of concurrently executing operations
    pub max_concurrent: usize,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self { max_concurrent: 8 }
    }
}

impl LimiterConfig {
    /// Create a new configuration builder
    pub fn builder() -> LimiterConfigBuilder {
        LimiterConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Builder for [`LimiterConfig`]
#[derive(Debug, Default)]
pub struct LimiterConfigBuilder {
    config: LimiterConfig,
}

impl LimiterConfigBuilder {
    pub fn new() -> Self {
        Self { config: LimiterConfig::default() }
    }

    pub fn max_concurrent(mut self, max: usize) -> Self {
        self.config.max_concurrent = max;
        self
    }

    pub fn build(self) -> Result<LimiterConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Snapshot of limiter activity for monitoring
#[derive(Debug, Clone)]
pub struct LimiterMetrics {
    /// Total number of operations started
    pub total_started: u64,
    /// Operations currently executing
    pub in_flight: usize,
    /// Highest concurrency observed since creation
    pub peak_in_flight: usize,
    /// Configured concurrency bound
    pub max_concurrent: usize,
}

impl LimiterMetrics {
    /// Current utilization as a fraction (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        self.in_flight as f64 / self.max_concurrent as f64
    }
}

/// FIFO concurrency limiter
///
/// Guarantees that at most `max_concurrent` submitted operations execute at
/// any point in time, and that queued operations *start* in submission
/// order. Completion order is unconstrained: a fast operation admitted later
/// may finish before a slow one admitted earlier.
///
/// # Examples
///
/// ```rust
/// use murmur_common::resilience::{ConcurrencyLimiter, LimiterConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = LimiterConfig::builder().max_concurrent(2).build()?;
/// let limiter = ConcurrencyLimiter::new(config)?;
///
/// let value: Result<_, std::io::Error> = limiter.run(|| async { Ok(42) }).await;
/// # Ok(())
/// # }
/// ```
pub struct ConcurrencyLimiter {
    config: LimiterConfig,
    semaphore: Arc<Semaphore>,
    total_started: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ConcurrencyLimiter {
    /// Create a new limiter with the given configuration
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: LimiterConfig) -> Result<Self, String> {
        config.validate()?;

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            total_started: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            config,
        })
    }

    /// Create a limiter with default configuration
    pub fn with_defaults() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(LimiterConfig::default().max_concurrent)),
            total_started: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            config: LimiterConfig::default(),
        }
    }

    /// Run an operation under the concurrency bound
    ///
    /// Starts immediately when a slot is free, otherwise waits in FIFO
    /// submission order (tokio's semaphore queues waiters fairly). The
    /// operation's output, success or failure, is returned untouched.
    pub async fn run<F, Fut, R>(&self, operation: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let permit = match self.semaphore.acquire().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                // The semaphore is never closed while the limiter is alive;
                // run unadmitted rather than stall the caller.
                warn!("limiter semaphore closed, running operation without admission control");
                None
            }
        };

        self.total_started.fetch_add(1, Ordering::Relaxed);
        let current = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::AcqRel);
        debug!(in_flight = current, max = self.config.max_concurrent, "operation admitted");

        let output = operation().await;

        self.in_flight.fetch_sub(1, Ordering::AcqRel);
        drop(permit);

        output
    }

    /// Get the current number of executing operations
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Get limiter metrics
    pub fn metrics(&self) -> LimiterMetrics {
        LimiterMetrics {
            total_started: self.total_started.load(Ordering::Acquire),
            in_flight: self.in_flight(),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
            max_concurrent: self.config.max_concurrent,
        }
    }
}

impl fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrencyLimiter")
            .field("max_concurrent", &self.config.max_concurrent)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the FIFO concurrency limiter.
    use std::time::Duration;

    use super::*;

    /// Validates `LimiterConfig` rejects a zero bound.
    #[test]
    fn test_config_validation() {
        assert!(LimiterConfig::builder().max_concurrent(0).build().is_err());
        assert!(LimiterConfig::builder().max_concurrent(1).build().is_ok());
    }

    /// Validates a single operation runs and returns its value.
    #[tokio::test]
    async fn test_limiter_basic() {
        let limiter = ConcurrencyLimiter::with_defaults();

        let result: Result<i32, std::io::Error> = limiter.run(|| async { Ok(42) }).await;
        assert_eq!(result.ok(), Some(42));
        assert_eq!(limiter.metrics().total_started, 1);
        assert_eq!(limiter.in_flight(), 0);
    }

    /// Validates a failed operation releases its slot and the next queued
    /// operation still runs.
    #[tokio::test]
    async fn test_limiter_failure_does_not_block_queue() {
        let config = LimiterConfig::builder().max_concurrent(1).build().unwrap();
        let limiter = Arc::new(ConcurrencyLimiter::new(config).unwrap());

        let failed: Result<(), &str> = limiter.run(|| async { Err("boom") }).await;
        assert_eq!(failed, Err("boom"));

        let ok: Result<i32, &str> = limiter.run(|| async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
        assert_eq!(limiter.metrics().total_started, 2);
    }

    /// Validates the bound holds under contention: with `max_concurrent = 2`
    /// and five submitted operations, the peak concurrency never exceeds 2
    /// and all five complete.
    #[tokio::test]
    async fn test_limiter_bound_holds() {
        let config = LimiterConfig::builder().max_concurrent(2).build().unwrap();
        let limiter = Arc::new(ConcurrencyLimiter::new(config).unwrap());

        let mut handles = Vec::new();
        for i in 0..5 {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter
                    .run(|| async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, std::io::Error>(i)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let metrics = limiter.metrics();
        assert_eq!(metrics.total_started, 5);
        assert!(metrics.peak_in_flight <= 2, "peak was {}", metrics.peak_in_flight);
        assert_eq!(metrics.in_flight, 0);
    }
}
