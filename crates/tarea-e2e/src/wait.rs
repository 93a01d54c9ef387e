//! Quiescence waits.
//!
//! The application mutates state through conventional form posts, so every
//! action ends in a full navigation. The harness turns that event-driven
//! reality into a synchronous script by suspending after each mutation until
//! the page reports no outstanding network activity. The wait is bounded; on
//! expiry it fails the scenario once, with no retry.

use crate::result::{TareaError, TareaResult};
use std::time::{Duration, Instant};

/// Default budget for a quiescence or interaction wait (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a wait result
    #[must_use]
    pub fn new(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            elapsed,
            waited_for: waited_for.into(),
        }
    }
}

/// Polling engine for quiescence synchronization.
///
/// Tracks in-flight request bookkeeping and exposes bounded wait loops over
/// it (or over arbitrary predicates).
#[derive(Debug, Clone)]
pub struct Waiter {
    /// How long the network must stay silent to count as idle
    idle_threshold: Duration,
    /// Pending network requests count
    pending_requests: usize,
    /// Time of last network activity
    last_network_activity: Option<Instant>,
}

impl Default for Waiter {
    fn default() -> Self {
        Self {
            idle_threshold: Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS),
            pending_requests: 0,
            last_network_activity: None,
        }
    }
}

impl Waiter {
    /// Create a new waiter with the default idle threshold
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the idle threshold.
    ///
    /// A zero threshold treats the instant the last response lands as idle,
    /// which is what the synchronous application double wants.
    #[must_use]
    pub const fn with_idle_threshold(mut self, threshold: Duration) -> Self {
        self.idle_threshold = threshold;
        self
    }

    /// Update pending request count
    pub fn set_pending_requests(&mut self, count: usize) {
        self.pending_requests = count;
        self.last_network_activity = Some(Instant::now());
    }

    /// Check if the network is idle
    #[must_use]
    pub fn is_network_idle(&self) -> bool {
        if self.pending_requests > 0 {
            return false;
        }
        match self.last_network_activity {
            Some(last) => last.elapsed() >= self.idle_threshold,
            None => true,
        }
    }

    /// Wait until the network is idle.
    ///
    /// # Errors
    ///
    /// Returns [`TareaError::Timeout`] if the budget expires first.
    pub fn wait_for_network_idle(&self, options: &WaitOptions) -> TareaResult<WaitResult> {
        self.wait_for_function(|| self.is_network_idle(), options)
            .map(|r| WaitResult::new(r.elapsed, "network idle"))
    }

    /// Wait for a predicate to return true.
    ///
    /// # Errors
    ///
    /// Returns [`TareaError::Timeout`] if the budget expires first.
    pub fn wait_for_function<F>(&self, predicate: F, options: &WaitOptions) -> TareaResult<WaitResult>
    where
        F: Fn() -> bool,
    {
        let start = Instant::now();
        loop {
            if predicate() {
                return Ok(WaitResult::new(start.elapsed(), "predicate"));
            }
            if start.elapsed() >= options.timeout() {
                return Err(TareaError::Timeout {
                    ms: options.timeout_ms,
                });
            }
            std::thread::sleep(options.poll_interval());
        }
    }
}

/// Wait for a condition with a bare timeout
///
/// # Errors
///
/// Returns [`TareaError::Timeout`] if the budget expires first.
pub fn wait_until<F>(predicate: F, timeout_ms: u64) -> TareaResult<()>
where
    F: Fn() -> bool,
{
    let waiter = Waiter::new();
    let options = WaitOptions::new().with_timeout(timeout_ms);
    waiter.wait_for_function(predicate, &options)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_chained() {
            let opts = WaitOptions::new().with_timeout(5000).with_poll_interval(100);
            assert_eq!(opts.timeout(), Duration::from_millis(5000));
            assert_eq!(opts.poll_interval(), Duration::from_millis(100));
        }
    }

    mod waiter_tests {
        use super::*;

        #[test]
        fn test_idle_with_no_activity() {
            let waiter = Waiter::new();
            assert!(waiter.is_network_idle());
        }

        #[test]
        fn test_not_idle_with_pending() {
            let mut waiter = Waiter::new();
            waiter.set_pending_requests(1);
            assert!(!waiter.is_network_idle());
        }

        #[test]
        fn test_fresh_response_not_yet_idle() {
            let mut waiter = Waiter::new();
            waiter.set_pending_requests(1);
            waiter.set_pending_requests(0);
            // the 500ms silence window has not elapsed
            assert!(!waiter.is_network_idle());
        }

        #[test]
        fn test_zero_threshold_is_immediately_idle() {
            let mut waiter = Waiter::new().with_idle_threshold(Duration::ZERO);
            waiter.set_pending_requests(1);
            waiter.set_pending_requests(0);
            assert!(waiter.is_network_idle());
        }

        #[test]
        fn test_wait_for_function_immediate_success() {
            let waiter = Waiter::new();
            let options = WaitOptions::new().with_timeout(100);
            assert!(waiter.wait_for_function(|| true, &options).is_ok());
        }

        #[test]
        fn test_wait_for_function_timeout() {
            let waiter = Waiter::new();
            let options = WaitOptions::new().with_timeout(100).with_poll_interval(10);
            let result = waiter.wait_for_function(|| false, &options);
            assert!(matches!(result, Err(TareaError::Timeout { ms: 100 })));
        }

        #[test]
        fn test_wait_for_network_idle_zero_threshold() {
            let mut waiter = Waiter::new().with_idle_threshold(Duration::ZERO);
            waiter.set_pending_requests(0);
            let options = WaitOptions::new().with_timeout(100);
            let result = waiter.wait_for_network_idle(&options).unwrap();
            assert_eq!(result.waited_for, "network idle");
        }
    }

    mod convenience_tests {
        use super::*;
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        #[test]
        fn test_wait_until_success() {
            assert!(wait_until(|| true, 100).is_ok());
        }

        #[test]
        fn test_wait_until_timeout() {
            assert!(wait_until(|| false, 100).is_err());
        }

        #[test]
        fn test_condition_becomes_true() {
            let flag = Arc::new(AtomicBool::new(false));
            let flag_clone = flag.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                flag_clone.store(true, Ordering::SeqCst);
            });
            assert!(wait_until(|| flag.load(Ordering::SeqCst), 2000).is_ok());
        }
    }
}
