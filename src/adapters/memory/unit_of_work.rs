//! In-memory unit of work.
//!
//! Holds the store's mutex for its whole life, so units of work run one at
//! a time. Writes go to a private copy that replaces the shared state only
//! on `commit`; dropping the unit of work discards them.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::OwnedMutexGuard;

use super::state::StoreState;
use crate::domain::booking::{Booking, NewBooking};
use crate::domain::catalog::{Action, Cafe, Dish, NewAction, NewCafe, NewDish, NewTable, Table};
use crate::domain::foundation::{
    ActionId, BookingId, CafeId, CafeScoped, DishId, DomainError, ErrorCode, SlotId, TableId,
    UserId,
};
use crate::domain::schedule::{NewTimeSlot, TimeSlot};
use crate::domain::user::User;
use crate::ports::UnitOfWork;

pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
}

impl InMemoryUnitOfWork {
    pub(crate) fn new(guard: OwnedMutexGuard<StoreState>) -> Self {
        let working = guard.clone();
        Self { guard, working }
    }
}

fn by_ids<K, V>(rows: &std::collections::BTreeMap<K, V>, cafe_id: CafeId, ids: &BTreeSet<K>) -> Vec<V>
where
    K: Ord,
    V: CafeScoped + Clone,
{
    ids.iter()
        .filter_map(|id| rows.get(id))
        .filter(|row| row.belongs_to(cafe_id))
        .cloned()
        .collect()
}

fn not_found(code: ErrorCode, what: &str, id: impl std::fmt::Display) -> DomainError {
    DomainError::new(code, format!("{} not found: {}", what, id))
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn get_cafe(&mut self, id: CafeId) -> Result<Option<Cafe>, DomainError> {
        Ok(self.working.cafes.get(&id).cloned())
    }

    async fn find_cafe_by_name(&mut self, name: &str) -> Result<Option<Cafe>, DomainError> {
        Ok(self.working.cafes.values().find(|c| c.name == name).cloned())
    }

    async fn get_users_by_ids(&mut self, ids: &BTreeSet<UserId>) -> Result<Vec<User>, DomainError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.user_with_managed_cafes(*id))
            .collect())
    }

    async fn get_table(&mut self, id: TableId) -> Result<Option<Table>, DomainError> {
        Ok(self.working.tables.get(&id).cloned())
    }

    async fn get_tables_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<TableId>,
    ) -> Result<Vec<Table>, DomainError> {
        Ok(by_ids(&self.working.tables, cafe_id, ids))
    }

    async fn get_slot(&mut self, id: SlotId) -> Result<Option<TimeSlot>, DomainError> {
        Ok(self.working.slots.get(&id).cloned())
    }

    async fn get_slots_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<SlotId>,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        Ok(by_ids(&self.working.slots, cafe_id, ids))
    }

    async fn get_active_slots_on(
        &mut self,
        cafe_id: CafeId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        Ok(self
            .working
            .slots
            .values()
            .filter(|s| s.cafe_id == cafe_id && s.date == date && s.active)
            .cloned()
            .collect())
    }

    async fn get_dish(&mut self, id: DishId) -> Result<Option<Dish>, DomainError> {
        Ok(self.working.dishes.get(&id).cloned())
    }

    async fn get_dishes_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<DishId>,
    ) -> Result<Vec<Dish>, DomainError> {
        Ok(by_ids(&self.working.dishes, cafe_id, ids))
    }

    async fn find_dish_by_name(
        &mut self,
        cafe_id: CafeId,
        name: &str,
    ) -> Result<Option<Dish>, DomainError> {
        Ok(self
            .working
            .dishes
            .values()
            .find(|d| d.cafe_id == cafe_id && d.name == name)
            .cloned())
    }

    async fn get_action(&mut self, id: ActionId) -> Result<Option<Action>, DomainError> {
        Ok(self.working.actions.get(&id).cloned())
    }

    async fn get_booking(&mut self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.working.bookings.get(&id).cloned())
    }

    async fn count_live_bookings_for_slot(&mut self, slot_id: SlotId) -> Result<u64, DomainError> {
        Ok(self
            .working
            .bookings
            .values()
            .filter(|b| b.is_live() && b.slot_ids.contains(&slot_id))
            .count() as u64)
    }

    async fn lock_cafe_day(&mut self, _cafe_id: CafeId, _date: NaiveDate) -> Result<(), DomainError> {
        // The store mutex already serializes every unit of work.
        Ok(())
    }

    async fn get_live_bookings_for_slot_overlap(
        &mut self,
        cafe_id: CafeId,
        date: NaiveDate,
        table_ids: &BTreeSet<TableId>,
        slot_ids: &BTreeSet<SlotId>,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, DomainError> {
        Ok(self
            .working
            .bookings
            .values()
            .filter(|b| b.cafe_id == cafe_id && b.booking_date == date)
            .filter(|b| Some(b.id) != exclude)
            .filter(|b| b.claims_any(table_ids, slot_ids))
            .cloned()
            .collect())
    }

    async fn insert_cafe(&mut self, new: NewCafe) -> Result<Cafe, DomainError> {
        let id = CafeId::new(self.working.next_id());
        let cafe = Cafe::from_new(id, new);
        self.working.cafes.insert(id, cafe.clone());
        Ok(cafe)
    }

    async fn update_cafe(&mut self, cafe: &Cafe) -> Result<(), DomainError> {
        match self.working.cafes.get_mut(&cafe.id) {
            Some(row) => {
                *row = cafe.clone();
                Ok(())
            }
            None => Err(not_found(ErrorCode::CafeNotFound, "Cafe", cafe.id)),
        }
    }

    async fn insert_table(&mut self, new: NewTable) -> Result<Table, DomainError> {
        let id = TableId::new(self.working.next_id());
        let table = Table::from_new(id, new);
        self.working.tables.insert(id, table.clone());
        Ok(table)
    }

    async fn update_table(&mut self, table: &Table) -> Result<(), DomainError> {
        match self.working.tables.get_mut(&table.id) {
            Some(row) => {
                *row = table.clone();
                Ok(())
            }
            None => Err(not_found(ErrorCode::TableNotFound, "Table", table.id)),
        }
    }

    async fn insert_slot(&mut self, new: NewTimeSlot) -> Result<TimeSlot, DomainError> {
        let id = SlotId::new(self.working.next_id());
        let slot = TimeSlot::from_new(id, new);
        self.working.slots.insert(id, slot.clone());
        Ok(slot)
    }

    async fn update_slot(&mut self, slot: &TimeSlot) -> Result<(), DomainError> {
        match self.working.slots.get_mut(&slot.id) {
            Some(row) => {
                *row = slot.clone();
                Ok(())
            }
            None => Err(not_found(ErrorCode::SlotNotFound, "TimeSlot", slot.id)),
        }
    }

    async fn insert_dish(&mut self, new: NewDish) -> Result<Dish, DomainError> {
        let id = DishId::new(self.working.next_id());
        let dish = Dish::from_new(id, new);
        self.working.dishes.insert(id, dish.clone());
        Ok(dish)
    }

    async fn update_dish(&mut self, dish: &Dish) -> Result<(), DomainError> {
        match self.working.dishes.get_mut(&dish.id) {
            Some(row) => {
                *row = dish.clone();
                Ok(())
            }
            None => Err(not_found(ErrorCode::DishNotFound, "Dish", dish.id)),
        }
    }

    async fn insert_action(&mut self, new: NewAction) -> Result<Action, DomainError> {
        let id = ActionId::new(self.working.next_id());
        let action = Action::from_new(id, new);
        self.working.actions.insert(id, action.clone());
        Ok(action)
    }

    async fn update_action(&mut self, action: &Action) -> Result<(), DomainError> {
        match self.working.actions.get_mut(&action.id) {
            Some(row) => {
                *row = action.clone();
                Ok(())
            }
            None => Err(not_found(ErrorCode::ActionNotFound, "Action", action.id)),
        }
    }

    async fn insert_booking(&mut self, new: NewBooking) -> Result<Booking, DomainError> {
        let id = BookingId::new(self.working.next_id());
        let booking = Booking::from_new(id, new);
        self.working.rewrite_claims(&booking)?;
        self.working.bookings.insert(id, booking.clone());
        Ok(booking)
    }

    async fn update_booking(&mut self, booking: &Booking) -> Result<(), DomainError> {
        if !self.working.bookings.contains_key(&booking.id) {
            return Err(not_found(ErrorCode::BookingNotFound, "Booking", booking.id));
        }
        self.working.rewrite_claims(booking)?;
        self.working.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
