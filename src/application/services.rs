//! Handler registry wired over one set of ports.

use std::sync::Arc;

use super::handlers::*;
use super::retry::RetryPolicy;
use crate::adapters::InMemoryStore;
use crate::ports::{BookingReader, CatalogReader, Clock, TransactionManager};

/// The storage and clock ports every handler is built from.
#[derive(Clone)]
pub struct Ports {
    pub transactions: Arc<dyn TransactionManager>,
    pub catalog: Arc<dyn CatalogReader>,
    pub bookings: Arc<dyn BookingReader>,
    pub clock: Arc<dyn Clock>,
}

impl Ports {
    /// All storage ports served by one in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transactions: store.clone(),
            catalog: store.clone(),
            bookings: store,
            clock,
        }
    }
}

/// Every command and query handler of the service.
pub struct Services {
    pub create_cafe: CreateCafeHandler,
    pub update_cafe: UpdateCafeHandler,
    pub get_cafe: GetCafeHandler,
    pub list_cafes: ListCafesHandler,

    pub create_table: CreateTableHandler,
    pub update_table: UpdateTableHandler,
    pub get_table: GetTableHandler,
    pub list_tables: ListTablesHandler,

    pub create_time_slot: CreateTimeSlotHandler,
    pub update_time_slot: UpdateTimeSlotHandler,
    pub get_time_slot: GetTimeSlotHandler,
    pub list_time_slots: ListTimeSlotsHandler,

    pub create_dish: CreateDishHandler,
    pub update_dish: UpdateDishHandler,
    pub get_dish: GetDishHandler,
    pub list_dishes: ListDishesHandler,

    pub create_action: CreateActionHandler,
    pub update_action: UpdateActionHandler,
    pub get_action: GetActionHandler,
    pub list_actions: ListActionsHandler,

    pub create_booking: CreateBookingHandler,
    pub update_booking: UpdateBookingHandler,
    pub get_booking: GetBookingHandler,
    pub list_bookings: ListBookingsHandler,
}

impl Services {
    pub fn new(ports: Ports, retry: RetryPolicy) -> Self {
        let Ports {
            transactions: tm,
            catalog,
            bookings,
            clock,
        } = ports;

        Self {
            create_cafe: CreateCafeHandler::new(tm.clone()).with_retry_policy(retry),
            update_cafe: UpdateCafeHandler::new(tm.clone()).with_retry_policy(retry),
            get_cafe: GetCafeHandler::new(catalog.clone()),
            list_cafes: ListCafesHandler::new(catalog.clone()),

            create_table: CreateTableHandler::new(tm.clone()).with_retry_policy(retry),
            update_table: UpdateTableHandler::new(tm.clone()).with_retry_policy(retry),
            get_table: GetTableHandler::new(catalog.clone()),
            list_tables: ListTablesHandler::new(catalog.clone()),

            create_time_slot: CreateTimeSlotHandler::new(tm.clone(), clock.clone())
                .with_retry_policy(retry),
            update_time_slot: UpdateTimeSlotHandler::new(tm.clone(), clock.clone())
                .with_retry_policy(retry),
            get_time_slot: GetTimeSlotHandler::new(catalog.clone()),
            list_time_slots: ListTimeSlotsHandler::new(catalog.clone(), clock.clone()),

            create_dish: CreateDishHandler::new(tm.clone()).with_retry_policy(retry),
            update_dish: UpdateDishHandler::new(tm.clone()).with_retry_policy(retry),
            get_dish: GetDishHandler::new(catalog.clone()),
            list_dishes: ListDishesHandler::new(catalog.clone()),

            create_action: CreateActionHandler::new(tm.clone()).with_retry_policy(retry),
            update_action: UpdateActionHandler::new(tm.clone()).with_retry_policy(retry),
            get_action: GetActionHandler::new(catalog.clone()),
            list_actions: ListActionsHandler::new(catalog),

            create_booking: CreateBookingHandler::new(tm.clone(), clock.clone())
                .with_retry_policy(retry),
            update_booking: UpdateBookingHandler::new(tm, clock).with_retry_policy(retry),
            get_booking: GetBookingHandler::new(bookings.clone()),
            list_bookings: ListBookingsHandler::new(bookings),
        }
    }
}
