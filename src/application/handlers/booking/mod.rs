//! Booking command and query handlers.

mod create_booking;
mod get_booking;
mod list_bookings;
mod update_booking;

pub use create_booking::{CreateBookingCommand, CreateBookingHandler};
pub use get_booking::{GetBookingHandler, GetBookingQuery};
pub use list_bookings::{ListBookingsHandler, ListBookingsQuery};
pub use update_booking::{UpdateBookingCommand, UpdateBookingHandler};
