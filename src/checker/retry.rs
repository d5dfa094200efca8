// src/checker/retry.rs
// =============================================================================
// Retry policy for transient network failures.
//
// Kept separate from the transport so it can be tested without a network:
// it only does arithmetic on attempt numbers.
//
//   attempt 0   first try
//   attempt 1   first retry,  after 1 x base delay
//   attempt 2   second retry, after 2 x base delay
//   ...         up to max_retries retries
// =============================================================================

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total number of attempts, first try included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Whether another attempt may follow the (0-based) attempt that just
    /// failed.
    pub fn can_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Delay to wait before the given (1-based) retry.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        linear_delay(self.base_delay, retry)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }
}

/// `base * n`, saturating instead of overflowing.
pub fn linear_delay(base: Duration, n: u32) -> Duration {
    base.saturating_mul(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_linearly() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_attempt_budget() {
        let policy = RetryPolicy::new(2, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 3);
        assert!(policy.can_retry_after(0));
        assert!(policy.can_retry_after(1));
        assert!(!policy.can_retry_after(2));
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.can_retry_after(0));
    }

    #[test]
    fn test_linear_delay_saturates() {
        assert_eq!(linear_delay(Duration::MAX, 2), Duration::MAX);
    }
}
