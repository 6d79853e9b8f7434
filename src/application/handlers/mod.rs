//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod action;
pub mod booking;
pub mod cafe;
pub mod dish;
pub mod table;
pub mod time_slot;

pub(crate) mod visibility;

#[cfg(test)]
pub(crate) mod test_support;

pub use action::{
    CreateActionCommand, CreateActionHandler, GetActionHandler, GetActionQuery,
    ListActionsHandler, ListActionsQuery, UpdateActionCommand, UpdateActionHandler,
};
pub use booking::{
    CreateBookingCommand, CreateBookingHandler, GetBookingHandler, GetBookingQuery,
    ListBookingsHandler, ListBookingsQuery, UpdateBookingCommand, UpdateBookingHandler,
};
pub use cafe::{
    CreateCafeCommand, CreateCafeHandler, GetCafeHandler, GetCafeQuery, ListCafesHandler,
    ListCafesQuery, UpdateCafeCommand, UpdateCafeHandler,
};
pub use dish::{
    CreateDishCommand, CreateDishHandler, GetDishHandler, GetDishQuery, ListDishesHandler,
    ListDishesQuery, UpdateDishCommand, UpdateDishHandler,
};
pub use table::{
    CreateTableCommand, CreateTableHandler, GetTableHandler, GetTableQuery, ListTablesHandler,
    ListTablesQuery, UpdateTableCommand, UpdateTableHandler,
};
pub use time_slot::{
    CreateTimeSlotCommand, CreateTimeSlotHandler, GetTimeSlotHandler, GetTimeSlotQuery,
    ListTimeSlotsHandler, ListTimeSlotsQuery, UpdateTimeSlotCommand, UpdateTimeSlotHandler,
};
