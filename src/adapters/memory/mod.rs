//! In-memory adapters for the storage ports.

mod state;
mod store;
mod unit_of_work;

pub use store::InMemoryStore;
pub use unit_of_work::InMemoryUnitOfWork;
