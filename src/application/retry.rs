//! Bounded retry of transactional commands.
//!
//! Storage may abort a transaction under concurrent load (serialization
//! failure, deadlock). Those aborts are retried here, with linear backoff,
//! and never reach the caller as such: once attempts run out the command
//! fails with `Conflict`. Every attempt is bounded by a timeout; dropping
//! the attempt's future drops its unit of work, which rolls it back.

use std::future::Future;
use std::time::Duration;

use crate::config::ReservationConfig;
use crate::domain::foundation::ServiceError;

/// How often and how long a transactional command may try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    /// A policy that never retries. Handy in tests.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ReservationConfig::default())
    }
}

impl From<&ReservationConfig> for RetryPolicy {
    fn from(config: &ReservationConfig) -> Self {
        Self {
            max_attempts: config.max_transaction_attempts.max(1),
            backoff: config.retry_backoff(),
            timeout: config.transaction_timeout(),
        }
    }
}

/// Runs `attempt` until it succeeds, fails terminally, or attempts run out.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut attempt: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut n: u32 = 1;
    loop {
        let outcome = match tokio::time::timeout(policy.timeout, attempt()).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(operation, attempt = n, "transaction timed out");
                return Err(ServiceError::Infrastructure(format!(
                    "{} timed out after {:?}",
                    operation, policy.timeout
                )));
            }
        };

        match outcome {
            Err(err) if err.is_retryable() => {
                if n >= policy.max_attempts {
                    tracing::warn!(operation, attempt = n, error = %err, "giving up after transaction aborts");
                    return Err(ServiceError::conflict(
                        "selected tables or time already taken",
                    ));
                }
                tracing::warn!(operation, attempt = n, error = %err, "transaction aborted, retrying");
                tokio::time::sleep(policy.backoff * n).await;
                n += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::from_millis(1),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn retries_aborts_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast(3), "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ServiceError::TransactionAborted("40001".to_string()))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_conflict() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast(2), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ServiceError::TransactionAborted("40001".to_string()))
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn terminal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast(5), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ServiceError::validation("slots", "bad"))
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Validation { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_attempt_times_out() {
        let policy = RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(1),
            timeout: Duration::from_millis(10),
        };
        let result: Result<(), _> = with_retry(&policy, "test", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(ServiceError::Infrastructure(_))));
    }

    #[test]
    fn policy_follows_reservation_config() {
        let policy = RetryPolicy::from(&ReservationConfig {
            max_transaction_attempts: 4,
            retry_backoff_ms: 10,
            transaction_timeout_ms: 2000,
        });
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.backoff, Duration::from_millis(10));
        assert_eq!(policy.timeout, Duration::from_secs(2));
    }
}
