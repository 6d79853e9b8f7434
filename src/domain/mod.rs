//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, errors, authorization evaluator)
//! - `catalog` - Cafes, tables, dishes and promotions
//! - `schedule` - Reservable time slots
//! - `booking` - Reservations and the availability rules
//! - `user` - Accounts and the per-request actor

pub mod booking;
pub mod catalog;
pub mod foundation;
pub mod schedule;
pub mod user;
