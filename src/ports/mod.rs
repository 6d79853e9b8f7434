//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Read Ports
//!
//! - `CatalogReader` - Cafes, tables, slots, dishes and promotions
//! - `BookingReader` - Booking detail and listings
//!
//! ## Write Ports
//!
//! - `TransactionManager` / `UnitOfWork` - Transactional entity store
//!
//! ## Infrastructure Ports
//!
//! - `Clock` - Current local time

mod booking_reader;
mod catalog_reader;
mod clock;
mod unit_of_work;

pub use booking_reader::{BookingAudience, BookingFilter, BookingReader};
pub use catalog_reader::CatalogReader;
pub use clock::Clock;
pub use unit_of_work::{TransactionManager, UnitOfWork};
