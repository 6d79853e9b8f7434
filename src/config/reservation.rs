//! Reservation transaction configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Bounds for the reservation transaction retry loop
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReservationConfig {
    /// Attempts per command when storage aborts the transaction
    #[serde(default = "default_max_attempts")]
    pub max_transaction_attempts: u32,

    /// Base backoff; attempt `n` waits `n * retry_backoff_ms`
    #[serde(default = "default_backoff")]
    pub retry_backoff_ms: u64,

    /// Upper bound for one transaction attempt
    #[serde(default = "default_timeout")]
    pub transaction_timeout_ms: u64,
}

impl ReservationConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }

    /// Validate reservation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=10).contains(&self.max_transaction_attempts) {
            return Err(ValidationError::InvalidTransactionAttempts);
        }
        if !(100..=60_000).contains(&self.transaction_timeout_ms) {
            return Err(ValidationError::InvalidTransactionTimeout);
        }
        Ok(())
    }
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            max_transaction_attempts: default_max_attempts(),
            retry_backoff_ms: default_backoff(),
            transaction_timeout_ms: default_timeout(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> u64 {
    25
}

fn default_timeout() -> u64 {
    5000
}
