//! PostgreSQL pool settings for the booking store
//!
//! Every reservation command holds one pooled connection for the length of
//! its transaction, advisory lock included, so `max_connections` bounds how
//! many cafe days can be booked in parallel.

use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

/// `CAFE_BOOKING__DATABASE__*` settings. Unset keys fall back to
/// [`DatabaseConfig::default`]; an empty `url` is rejected by `validate`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL
    pub url: String,
    /// Connections kept open while idle
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a command waits for a free connection before failing
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// Apply `migrations/` before serving
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 2,
            max_connections: 20,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            run_migrations: false,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout())
            .idle_timeout(self.idle_timeout())
            .max_lifetime(self.max_lifetime())
    }

    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        self.pool_options().connect(&self.url).await
    }

    /// The URL with its password masked, for startup logs.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        match rest.rsplit_once('@') {
            Some((credentials, host)) => match credentials.split_once(':') {
                Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
                None => self.url.clone(),
            },
            None => self.url.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("CAFE_BOOKING__DATABASE__URL"));
        }
        match self.url.split_once("://") {
            Some(("postgres" | "postgresql", rest)) if !rest.is_empty() => {}
            _ => return Err(ValidationError::InvalidDatabaseUrl),
        }
        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidAcquireTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_url(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn defaults_are_valid_once_url_is_set() {
        let config = with_url("postgresql://cafe@localhost/bookings");
        assert!(config.validate().is_ok());
        assert!(!config.run_migrations);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn unset_keys_fall_back_to_defaults() {
        let config: DatabaseConfig = serde_json::from_value(serde_json::json!({
            "url": "postgres://cafe@db/bookings",
            "max_connections": 40,
        }))
        .unwrap();
        assert_eq!(config.max_connections, 40);
        assert_eq!(config.min_connections, DatabaseConfig::default().min_connections);
        assert_eq!(config.max_lifetime(), Duration::from_secs(1800));
    }

    #[test]
    fn pool_options_carry_limits() {
        let config = DatabaseConfig {
            min_connections: 1,
            max_connections: 4,
            acquire_timeout_secs: 3,
            idle_timeout_secs: 60,
            ..with_url("postgres://cafe@db/bookings")
        };
        let options = config.pool_options();
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(3));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn blank_url_is_missing() {
        assert_eq!(
            with_url("  ").validate(),
            Err(ValidationError::MissingRequired("CAFE_BOOKING__DATABASE__URL"))
        );
    }

    #[test]
    fn only_postgres_schemes_are_accepted() {
        for url in ["mysql://cafe@db/bookings", "postgres://", "localhost/bookings"] {
            assert_eq!(
                with_url(url).validate(),
                Err(ValidationError::InvalidDatabaseUrl),
                "{}",
                url
            );
        }
    }

    #[test]
    fn pool_bounds_are_checked() {
        let inverted = DatabaseConfig {
            min_connections: 8,
            max_connections: 4,
            ..with_url("postgres://db/bookings")
        };
        assert_eq!(inverted.validate(), Err(ValidationError::InvalidPoolSize));

        let empty = DatabaseConfig {
            min_connections: 0,
            max_connections: 0,
            ..with_url("postgres://db/bookings")
        };
        assert_eq!(empty.validate(), Err(ValidationError::InvalidPoolSize));

        let oversized = DatabaseConfig {
            max_connections: 101,
            ..with_url("postgres://db/bookings")
        };
        assert_eq!(oversized.validate(), Err(ValidationError::PoolSizeTooLarge));
    }

    #[test]
    fn zero_acquire_timeout_is_rejected() {
        let config = DatabaseConfig {
            acquire_timeout_secs: 0,
            ..with_url("postgres://db/bookings")
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidAcquireTimeout));
    }

    #[test]
    fn redacted_url_masks_password_only() {
        assert_eq!(
            with_url("postgresql://cafe:s3cr@t@db:5432/bookings").redacted_url(),
            "postgresql://cafe:***@db:5432/bookings"
        );
        assert_eq!(
            with_url("postgres://cafe@db/bookings").redacted_url(),
            "postgres://cafe@db/bookings"
        );
    }
}
