//! Clock abstraction for time-dependent code
//!
//! Production code reads time through [`Clock`] so tests can substitute
//! [`MockClock`] and advance time explicitly instead of sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;

    /// Get current system time (wall clock)
    fn system_time(&self) -> SystemTime;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient cloning
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }
}

/// Mock clock for deterministic testing
///
/// Allows tests to control time progression without actual delays.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    base: SystemTime,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            base: SystemTime::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Advance the mock clock by a duration
    ///
    /// Simulates the passage of time without actual delays.
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Advance the mock clock by milliseconds (convenience method)
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        self.base + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the clock abstraction.
    use super::*;

    /// Validates `MockClock::advance` moves both monotonic and wall time.
    #[test]
    fn test_mock_clock_advance() {
        let clock = MockClock::new();
        let before = clock.now();
        let wall_before = clock.system_time();

        clock.advance(Duration::from_secs(5));

        assert_eq!(clock.now() - before, Duration::from_secs(5));
        assert_eq!(
            clock.system_time().duration_since(wall_before).unwrap_or_default(),
            Duration::from_secs(5)
        );
    }

    /// Validates cloned `MockClock` handles share the same timeline.
    #[test]
    fn test_mock_clock_clone_shares_time() {
        let clock = MockClock::new();
        let other = clock.clone();

        clock.advance_millis(250);

        assert_eq!(other.now(), clock.now());
    }

    /// Validates `SystemClock::now` is monotonic.
    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
