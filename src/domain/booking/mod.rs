//! Booking module - reservations and the rules that admit them.
//!
//! # Module Structure
//!
//! - `aggregate` - The `Booking` aggregate and its partial update
//! - `status` - Lifecycle state machine
//! - `availability` - Pure checks run by the availability engine

mod aggregate;
mod availability;
mod status;

pub use aggregate::{validate_guests, Booking, BookingPatch, NewBooking};
pub use availability::{
    check_capacity, ensure_cafe_open, find_conflict, resolve_dishes, resolve_slots,
    resolve_tables, Reservation, ReservationRequest,
};
pub use status::BookingStatus;
