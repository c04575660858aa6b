use crate::config::RetryPolicy;
use crate::domain::order::PaymentId;
use crate::domain::payment::PaymentStatus;
use crate::domain::ports::PaymentAuthorityRef;
use tracing::warn;

/// What the engine learned about a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Resolved(PaymentStatus),
    /// Every attempt failed; settlement treats this as a failed payment.
    Indeterminate,
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Resolved(status) if status.is_success())
    }
}

/// Queries the payment authority with a fixed retry budget.
pub struct PaymentStatusClient {
    authority: PaymentAuthorityRef,
    policy: RetryPolicy,
}

impl PaymentStatusClient {
    pub fn new(authority: PaymentAuthorityRef, policy: RetryPolicy) -> Self {
        Self { authority, policy }
    }

    /// Fetches the status, retrying transient failures `policy.retries` times with
    /// a fixed pause in between. Never fails: exhaustion yields `Indeterminate`.
    pub async fn resolve(&self, payment_id: &PaymentId) -> PaymentOutcome {
        let attempts = self.policy.attempts();
        for attempt in 1..=attempts {
            match self.authority.fetch_status(payment_id).await {
                Ok(status) => return PaymentOutcome::Resolved(status),
                Err(e) => {
                    warn!(
                        payment_id = %payment_id,
                        "Error checking payment status (attempt {attempt}/{attempts}): {e}"
                    );
                }
            }
            if attempt < attempts && !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
        }
        PaymentOutcome::Indeterminate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::PaymentAuthority;
    use crate::error::{EngineError, Result};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails `failures` times, then answers `status`.
    struct Flaky {
        failures: u32,
        status: &'static str,
        calls: AtomicU32,
    }

    #[async_trait]
    impl PaymentAuthority for Flaky {
        async fn fetch_status(&self, _payment_id: &PaymentId) -> Result<PaymentStatus> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(EngineError::Transient("connection refused".to_string()))
            } else {
                Ok(PaymentStatus::from(self.status))
            }
        }
    }

    fn client(failures: u32, retries: u32) -> (PaymentStatusClient, Arc<Flaky>) {
        let authority = Arc::new(Flaky {
            failures,
            status: "Success",
            calls: AtomicU32::new(0),
        });
        let policy = RetryPolicy {
            retries,
            delay: Duration::ZERO,
        };
        (PaymentStatusClient::new(authority.clone(), policy), authority)
    }

    #[tokio::test]
    async fn test_first_attempt_resolves() {
        let (client, authority) = client(0, 2);
        let outcome = client.resolve(&PaymentId::from("pay-1")).await;
        assert_eq!(outcome, PaymentOutcome::Resolved(PaymentStatus::Success));
        assert_eq!(authority.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_within_budget_still_resolve() {
        let (client, authority) = client(2, 2);
        let outcome = client.resolve(&PaymentId::from("pay-1")).await;
        assert!(outcome.is_success());
        assert_eq!(authority.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_budget_is_indeterminate() {
        let (client, authority) = client(3, 2);
        let outcome = client.resolve(&PaymentId::from("pay-1")).await;
        assert_eq!(outcome, PaymentOutcome::Indeterminate);
        assert!(!outcome.is_success());
        assert_eq!(authority.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let (client, authority) = client(1, 0);
        let outcome = client.resolve(&PaymentId::from("pay-1")).await;
        assert_eq!(outcome, PaymentOutcome::Indeterminate);
        assert_eq!(authority.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_resolved_not_retried() {
        let authority = Arc::new(Flaky {
            failures: 0,
            status: "Created",
            calls: AtomicU32::new(0),
        });
        let client = PaymentStatusClient::new(authority.clone(), RetryPolicy::default());
        let outcome = client.resolve(&PaymentId::from("pay-1")).await;
        assert_eq!(
            outcome,
            PaymentOutcome::Resolved(PaymentStatus::Other("Created".to_string()))
        );
        assert!(!outcome.is_success());
        assert_eq!(authority.calls.load(Ordering::SeqCst), 1);
    }
}
