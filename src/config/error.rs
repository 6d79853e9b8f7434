//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Connection acquire timeout must be at least 1 second")]
    InvalidAcquireTimeout,

    #[error("Invalid log level directive: {0}")]
    InvalidLogLevel(String),

    #[error("Transaction attempts must be between 1 and 10")]
    InvalidTransactionAttempts,

    #[error("Transaction timeout must be between 100 and 60000 ms")]
    InvalidTransactionTimeout,
}
