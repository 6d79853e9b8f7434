use std::sync::Arc;

use cafe_booking::adapters::postgres::{
    PostgresBookingReader, PostgresCatalogReader, PostgresTransactionManager,
};
use cafe_booking::adapters::SystemClock;
use cafe_booking::application::{Ports, RetryPolicy, Services};
use cafe_booking::config::AppConfig;
use cafe_booking::telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init_tracing(&config.logging)?;

    let pool = config.database.connect().await?;
    info!(
        database = %config.database.redacted_url(),
        max_connections = config.database.max_connections,
        "Connected to PostgreSQL"
    );

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations applied");
    }

    let ports = Ports {
        transactions: Arc::new(PostgresTransactionManager::new(
            pool.clone(),
            config.reservation.transaction_timeout(),
        )),
        catalog: Arc::new(PostgresCatalogReader::new(pool.clone())),
        bookings: Arc::new(PostgresBookingReader::new(pool.clone())),
        clock: Arc::new(SystemClock),
    };
    let retry = RetryPolicy::from(&config.reservation);
    let _services = Services::new(ports, retry);

    info!(
        max_attempts = retry.max_attempts,
        production = config.is_production(),
        "cafe-booking ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    pool.close().await;
    Ok(())
}
