use crate::error::{EngineError, Result};
use std::time::Duration;

/// Bounded, fixed-delay retry for payment-status lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made after the first one fails.
    pub retries: u32,
    /// Pause between attempts. No backoff.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            delay: Duration::from_secs(1),
        }
    }
}

/// Tunables of the settlement engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub price_refresh_interval: Duration,
    /// Simulated clearing time between the payment decision and the terminal write.
    pub settlement_delay: Duration,
    pub payment_retry: RetryPolicy,
    /// Per-request timeout of the HTTP payment authority.
    pub payment_timeout: Duration,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.price_refresh_interval.is_zero() {
            return Err(EngineError::ValidationError(
                "Price refresh interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            price_refresh_interval: Duration::from_secs(60),
            settlement_delay: Duration::from_secs(5),
            payment_retry: RetryPolicy::default(),
            payment_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.price_refresh_interval, Duration::from_secs(60));
        assert_eq!(config.settlement_delay, Duration::from_secs(5));
        assert_eq!(config.payment_retry.retries, 2);
        assert_eq!(config.payment_retry.attempts(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_refresh_interval_rejected() {
        let config = EngineConfig {
            price_refresh_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::ValidationError(_))
        ));
    }
}
