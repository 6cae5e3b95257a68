//! Per-call client settings and reconfigure backoff.
//!
//! Controllers carry a [`ClientConfig`]: the timeout bounds every transport
//! call made on their behalf, and the [`RetryPolicy`] paces the standalone
//! reconfigure used to recover from a partial failure.

use std::time::Duration;

/// Default per-call timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default number of reconfigure retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 4;

/// Default pause before the first retry, in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Default upper bound for a single pause, in milliseconds
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 30_000;

/// Doubling backoff between reconfigure attempts.
///
/// A restarting service (Unbound in particular) can take several seconds to
/// answer again, so pauses grow from `initial_delay` up to `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt; 0 disables retrying
    pub max_retries: u32,
    /// Pause before the first retry
    pub initial_delay: Duration,
    /// Cap for any single pause
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy with the default retry count and delays.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS),
        }
    }

    /// Set the number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the first pause.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the pause cap.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Whether another attempt is allowed after `failures` failed ones.
    #[must_use]
    pub const fn allows_retry(&self, failures: u32) -> bool {
        failures > 0 && failures <= self.max_retries
    }

    /// Pause after the `failures`-th failed attempt: `initial_delay`, doubled
    /// for every further failure, never above `max_delay`.
    #[must_use]
    pub fn backoff(&self, failures: u32) -> Duration {
        let Some(doublings) = failures.checked_sub(1) else {
            return Duration::ZERO;
        };

        2u32.checked_pow(doublings)
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings applied to every operation a controller performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound for a single transport call; `None` leaves it to the transport
    pub request_timeout: Option<Duration>,

    /// Backoff for standalone reconfigures
    pub retry_policy: RetryPolicy,
}

impl ClientConfig {
    /// Settings with a 60 second call timeout and the default backoff.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            retry_policy: RetryPolicy::new(),
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the reconfigure backoff.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared default used by controllers that do not carry their own settings.
pub static DEFAULT_CLIENT_CONFIG: ClientConfig = ClientConfig::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::new();

        assert_eq!(policy.backoff(0), Duration::ZERO);
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
        assert_eq!(policy.backoff(5), Duration::from_secs(16));
        assert_eq!(policy.backoff(6), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_survives_overflow() {
        let policy = RetryPolicy::new().with_max_delay(Duration::from_secs(120));
        assert_eq!(policy.backoff(40), Duration::from_secs(120));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_secs(120));
    }

    #[test]
    fn test_allows_retry_counts_failures() {
        let policy = RetryPolicy::new().with_max_retries(2);
        assert!(!policy.allows_retry(0));
        assert!(policy.allows_retry(1));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));

        assert!(!RetryPolicy::new().with_max_retries(0).allows_retry(1));
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.retry_policy.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(DEFAULT_CLIENT_CONFIG, config);
    }

    #[test]
    fn test_client_config_builder() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(250))
            .with_max_delay(Duration::from_secs(2));
        let config = ClientConfig::new()
            .with_request_timeout(Duration::from_secs(5))
            .with_retry_policy(policy);

        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.retry_policy.backoff(3), Duration::from_secs(1));
        assert_eq!(config.retry_policy.backoff(4), Duration::from_secs(2));
    }
}
