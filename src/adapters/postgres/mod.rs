//! PostgreSQL adapters - sqlx implementations of the storage ports.
//!
//! - `PostgresTransactionManager` / `PostgresUnitOfWork` - Transactional writes
//! - `PostgresCatalogReader` - Catalog queries
//! - `PostgresBookingReader` - Booking detail and listings

mod booking_reader;
mod catalog_reader;
mod errors;
mod queries;
mod rows;
mod unit_of_work;

pub use booking_reader::PostgresBookingReader;
pub use catalog_reader::PostgresCatalogReader;
pub use errors::classify_sqlstate;
pub use unit_of_work::{PostgresTransactionManager, PostgresUnitOfWork};
