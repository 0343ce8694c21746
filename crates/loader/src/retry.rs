//! Exponential-backoff retry policy for bulk submits.
//!
//! The delay before retry `n` (the first retry is `n = 1`) is
//! `initial_delay * multiplier^n`, clamped to `max_delay`. No delay follows
//! the final attempt.

use std::time::Duration;

/// Tunable parameters for the retry strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per chunk, including the first.
    pub attempts: u32,
    /// Base delay; the first retry waits `initial_delay * multiplier`.
    pub initial_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Sum of every backoff delay a chunk sleeps through when all attempts fail.
    pub fn total_backoff(&self) -> Duration {
        (1..self.attempts).map(|retry| self.delay_for(retry)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delays_double_from_200ms() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for(4), Duration::from_millis(1600));
    }

    #[test]
    fn delay_clamps_at_max() {
        let policy = RetryPolicy {
            max_delay: Duration::from_secs(1),
            ..Default::default()
        };
        assert_eq!(policy.delay_for(10), Duration::from_secs(1));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn total_backoff_skips_final_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.total_backoff(), Duration::from_millis(3000));

        let single = RetryPolicy {
            attempts: 1,
            ..Default::default()
        };
        assert_eq!(single.total_backoff(), Duration::ZERO);
    }
}
