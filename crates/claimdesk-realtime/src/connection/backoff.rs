//! Capped exponential reconnect backoff.

use std::time::Duration;

use claimdesk_core::config::RealtimeConfig;

/// Reconnect schedule: `min(base * 2^attempt, cap)` for at most
/// `max_retries` consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect.
    pub base: Duration,
    /// Upper bound for any single delay.
    pub cap: Duration,
    /// Consecutive reconnects allowed without a successful open.
    pub max_retries: u32,
}

impl ReconnectPolicy {
    /// Build the policy from realtime settings.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            base: config.base_delay(),
            cap: config.max_delay(),
            max_retries: config.max_retries,
        }
    }

    /// Delay before reconnect number `attempt` (0-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.cap)
    }

    /// Whether another reconnect may be scheduled after `attempt` reconnects.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&RealtimeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy = ReconnectPolicy::default();

        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_secs(16));
        // 32s is past the 30s cap
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(30));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(30));
    }

    #[test]
    fn test_should_retry_bound() {
        let policy = ReconnectPolicy {
            max_retries: 2,
            ..ReconnectPolicy::default()
        };
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }
}
