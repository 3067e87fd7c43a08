use std::time::Duration;

use rand::Rng;

/// Bounded exponential backoff used by the page fetcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per page, including the first one. Always at least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
    /// Relative jitter applied to each delay (0.1 = ±10%).
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self { max_attempts: 1, ..Self::immediate(1) }
    }

    /// `max_attempts` attempts with zero delay between them.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
            jitter: 0.0,
        }
    }

    /// Deterministic delay after failed attempt number `attempt` (1-based), capped at
    /// `max_backoff`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_backoff.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            Duration::ZERO
        }
    }

    /// [`backoff_for`](Self::backoff_for) with jitter applied.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff_for(attempt);
        if self.jitter <= 0.0 || base.is_zero() {
            return base;
        }
        let factor = rand::rng().random_range((1.0 - self.jitter)..=(1.0 + self.jitter));
        base.mul_f64(factor.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_exponentially() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(1));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(2));
    }

    #[test]
    fn test_backoff_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(10), Duration::from_secs(8));
        assert_eq!(policy.backoff_for(u32::MAX), Duration::from_secs(8));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let delay = policy.delay_for(2);
            assert!(delay >= Duration::from_millis(900), "{:?}", delay);
            assert!(delay <= Duration::from_millis(1100), "{:?}", delay);
        }
    }

    #[test]
    fn test_immediate_policy_never_waits() {
        let policy = RetryPolicy::immediate(0);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_for(5), Duration::ZERO);
        assert_eq!(RetryPolicy::no_retry().max_attempts, 1);
    }
}
