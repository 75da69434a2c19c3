//! Exponential backoff policy for retrying upstream requests.

use std::time::Duration;

/// Tunable parameters for the retry strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failed attempt.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based).
    ///
    /// `base_delay * multiplier^attempt`, clamped to `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(i32::MAX as u32) as i32);
        let millis = self.base_delay.as_millis() as f64 * factor;
        let max_ms = self.max_delay.as_millis() as f64;
        Duration::from_millis(millis.min(max_ms) as u64)
    }

    /// Delay before retry `attempt`, honouring a server-supplied
    /// `Retry-After` value when one is present. Still clamped to `max_delay`.
    pub fn delay_with_hint(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint.min(self.max_delay),
            None => self.delay_for_attempt(attempt),
        }
    }
}

/// Parse an HTTP `Retry-After` header given in delta-seconds.
///
/// The HTTP-date form is not supported and yields `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(4000));
    }

    #[test]
    fn delay_is_clamped_to_max() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(8));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(8));
    }

    #[test]
    fn retry_after_hint_overrides_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_with_hint(0, Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
        assert_eq!(
            policy.delay_with_hint(0, Some(Duration::from_secs(120))),
            Duration::from_secs(8)
        );
        assert_eq!(policy.delay_with_hint(1, None), Duration::from_millis(1000));
    }

    #[test]
    fn parses_delta_seconds_only() {
        assert_eq!(parse_retry_after("7"), Some(Duration::from_secs(7)));
        assert_eq!(parse_retry_after(" 12 "), Some(Duration::from_secs(12)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn no_retries_policy() {
        assert_eq!(RetryPolicy::no_retries().max_retries, 0);
    }
}
