//! Time slot command and query handlers.

mod create_time_slot;
mod get_time_slot;
mod update_time_slot;

pub use create_time_slot::{CreateTimeSlotCommand, CreateTimeSlotHandler};
pub use get_time_slot::{
    GetTimeSlotHandler, GetTimeSlotQuery, ListTimeSlotsHandler, ListTimeSlotsQuery,
};
pub use update_time_slot::{UpdateTimeSlotCommand, UpdateTimeSlotHandler};
