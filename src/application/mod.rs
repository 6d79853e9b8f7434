//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod availability;
pub mod handlers;
pub mod retry;
mod services;

pub use availability::{check_dishes, validate_and_reserve, ReserveOptions};
pub use retry::{with_retry, RetryPolicy};
pub use services::{Ports, Services};
