//! Unit of work port (write side).
//!
//! Every mutating handler runs inside one unit of work: the lookups it
//! validates against and the writes it makes commit or vanish together.
//!
//! # Design
//!
//! - **Transactional**: dropping a unit of work without `commit` rolls it back
//! - **Lookups never fail on absence**: missing rows come back as `None` or
//!   are left out of the result; the caller decides what that means
//! - **Narrow locking**: `lock_cafe_day` serializes writers of one cafe and
//!   date, nothing wider

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::booking::{Booking, NewBooking};
use crate::domain::catalog::{Action, Cafe, Dish, NewAction, NewCafe, NewDish, NewTable, Table};
use crate::domain::foundation::{
    ActionId, BookingId, CafeId, DishId, DomainError, SlotId, TableId, UserId,
};
use crate::domain::schedule::{NewTimeSlot, TimeSlot};
use crate::domain::user::User;

/// Opens units of work.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Begin a new unit of work.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` if no connection could be acquired
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError>;
}

/// A transactional handle over the entity store.
#[async_trait]
pub trait UnitOfWork: Send {
    // ─────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────

    async fn get_cafe(&mut self, id: CafeId) -> Result<Option<Cafe>, DomainError>;

    /// Case-sensitive exact match on the unique cafe name.
    async fn find_cafe_by_name(&mut self, name: &str) -> Result<Option<Cafe>, DomainError>;

    /// Users among `ids` that exist. Unknown ids are omitted.
    async fn get_users_by_ids(&mut self, ids: &BTreeSet<UserId>) -> Result<Vec<User>, DomainError>;

    async fn get_table(&mut self, id: TableId) -> Result<Option<Table>, DomainError>;

    /// Tables among `ids` that belong to `cafe_id`, active or not.
    async fn get_tables_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<TableId>,
    ) -> Result<Vec<Table>, DomainError>;

    async fn get_slot(&mut self, id: SlotId) -> Result<Option<TimeSlot>, DomainError>;

    /// Slots among `ids` that belong to `cafe_id`, active or not.
    async fn get_slots_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<SlotId>,
    ) -> Result<Vec<TimeSlot>, DomainError>;

    /// Active slots of a cafe on one date.
    async fn get_active_slots_on(
        &mut self,
        cafe_id: CafeId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, DomainError>;

    async fn get_dish(&mut self, id: DishId) -> Result<Option<Dish>, DomainError>;

    /// Dishes among `ids` that belong to `cafe_id`, active or not.
    async fn get_dishes_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<DishId>,
    ) -> Result<Vec<Dish>, DomainError>;

    async fn find_dish_by_name(
        &mut self,
        cafe_id: CafeId,
        name: &str,
    ) -> Result<Option<Dish>, DomainError>;

    async fn get_action(&mut self, id: ActionId) -> Result<Option<Action>, DomainError>;

    async fn get_booking(&mut self, id: BookingId) -> Result<Option<Booking>, DomainError>;

    /// Live bookings holding `slot_id`.
    async fn count_live_bookings_for_slot(&mut self, slot_id: SlotId) -> Result<u64, DomainError>;

    // ─────────────────────────────────────────────────────────────────────
    // Reservation critical section
    // ─────────────────────────────────────────────────────────────────────

    /// Exclusive lock on one cafe and date, held until commit or rollback.
    async fn lock_cafe_day(&mut self, cafe_id: CafeId, date: NaiveDate) -> Result<(), DomainError>;

    /// Live bookings of `cafe_id` on `date`, other than `exclude`, that hold
    /// any of `table_ids` in any of `slot_ids`.
    async fn get_live_bookings_for_slot_overlap(
        &mut self,
        cafe_id: CafeId,
        date: NaiveDate,
        table_ids: &BTreeSet<TableId>,
        slot_ids: &BTreeSet<SlotId>,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, DomainError>;

    // ─────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────

    async fn insert_cafe(&mut self, new: NewCafe) -> Result<Cafe, DomainError>;

    /// # Errors
    ///
    /// - `CafeNotFound` if the cafe doesn't exist
    async fn update_cafe(&mut self, cafe: &Cafe) -> Result<(), DomainError>;

    async fn insert_table(&mut self, new: NewTable) -> Result<Table, DomainError>;

    async fn update_table(&mut self, table: &Table) -> Result<(), DomainError>;

    async fn insert_slot(&mut self, new: NewTimeSlot) -> Result<TimeSlot, DomainError>;

    async fn update_slot(&mut self, slot: &TimeSlot) -> Result<(), DomainError>;

    async fn insert_dish(&mut self, new: NewDish) -> Result<Dish, DomainError>;

    async fn update_dish(&mut self, dish: &Dish) -> Result<(), DomainError>;

    async fn insert_action(&mut self, new: NewAction) -> Result<Action, DomainError>;

    async fn update_action(&mut self, action: &Action) -> Result<(), DomainError>;

    /// Insert a booking with its table, slot and dish associations and, as
    /// it starts live, its claims.
    ///
    /// # Errors
    ///
    /// - `BookingConflict` if a claim is already held by another booking
    async fn insert_booking(&mut self, new: NewBooking) -> Result<Booking, DomainError>;

    /// Rewrite a booking row, its associations and its claims.
    ///
    /// # Errors
    ///
    /// - `BookingNotFound` if the booking doesn't exist
    /// - `BookingConflict` if a claim is already held by another booking
    async fn update_booking(&mut self, booking: &Booking) -> Result<(), DomainError>;

    /// Make every write of this unit of work durable.
    ///
    /// # Errors
    ///
    /// - `SerializationFailure` if storage aborted the transaction
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_object_safe() {
        fn _accepts_manager(_tm: &dyn TransactionManager) {}
        fn _accepts_uow(_uow: Box<dyn UnitOfWork>) {}
    }
}
