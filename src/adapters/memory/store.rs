//! In-memory entity store.
//!
//! Implements every storage port over one shared [`StoreState`]. Useful
//! for tests and local development.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::state::StoreState;
use super::unit_of_work::InMemoryUnitOfWork;
use crate::domain::booking::Booking;
use crate::domain::catalog::{Action, Cafe, Dish, Table};
use crate::domain::foundation::{
    ActionId, BookingId, CafeId, DishId, DomainError, ReadScope, SlotId, TableId, UserId,
};
use crate::domain::schedule::TimeSlot;
use crate::domain::user::User;
use crate::ports::{BookingFilter, BookingReader, CatalogReader, TransactionManager, UnitOfWork};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user account. Accounts are owned by the authentication
    /// service, so there is no port for this.
    pub async fn add_user(&self, mut user: User) -> User {
        let mut state = self.state.lock().await;
        if user.id.as_i64() <= 0 {
            user.id = UserId::new(state.next_id());
        } else {
            state.observe_id(user.id.as_i64());
        }
        user.managed_cafe_ids.clear();
        state.users.insert(user.id, user.clone());
        user
    }

    /// Loads a user with managed cafes derived from cafe manager sets.
    pub async fn user(&self, id: UserId) -> Option<User> {
        self.state.lock().await.user_with_managed_cafes(id)
    }

    /// Number of (table, slot) claims currently held.
    pub async fn claim_count(&self) -> usize {
        self.state.lock().await.claims.len()
    }
}

#[async_trait]
impl TransactionManager for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(InMemoryUnitOfWork::new(guard)))
    }
}

#[async_trait]
impl CatalogReader for InMemoryStore {
    async fn get_cafe(&self, id: CafeId) -> Result<Option<Cafe>, DomainError> {
        Ok(self.state.lock().await.cafes.get(&id).cloned())
    }

    async fn list_cafes(&self, scope: ReadScope) -> Result<Vec<Cafe>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .cafes
            .values()
            .filter(|c| scope.admits(c.active))
            .cloned()
            .collect())
    }

    async fn get_table(&self, id: TableId) -> Result<Option<Table>, DomainError> {
        Ok(self.state.lock().await.tables.get(&id).cloned())
    }

    async fn list_tables(&self, cafe_id: CafeId, scope: ReadScope) -> Result<Vec<Table>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .tables
            .values()
            .filter(|t| t.cafe_id == cafe_id && scope.admits(t.active))
            .cloned()
            .collect())
    }

    async fn get_slot(&self, id: SlotId) -> Result<Option<TimeSlot>, DomainError> {
        Ok(self.state.lock().await.slots.get(&id).cloned())
    }

    async fn list_slots(
        &self,
        cafe_id: CafeId,
        date: NaiveDate,
        scope: ReadScope,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        let state = self.state.lock().await;
        let mut slots: Vec<TimeSlot> = state
            .slots
            .values()
            .filter(|s| s.cafe_id == cafe_id && s.date == date && scope.admits(s.active))
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.start_time, s.id));
        Ok(slots)
    }

    async fn get_dish(&self, id: DishId) -> Result<Option<Dish>, DomainError> {
        Ok(self.state.lock().await.dishes.get(&id).cloned())
    }

    async fn list_dishes(
        &self,
        cafe_id: Option<CafeId>,
        scope: ReadScope,
    ) -> Result<Vec<Dish>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .dishes
            .values()
            .filter(|d| cafe_id.map_or(true, |id| d.cafe_id == id) && scope.admits(d.active))
            .cloned()
            .collect())
    }

    async fn get_action(&self, id: ActionId) -> Result<Option<Action>, DomainError> {
        Ok(self.state.lock().await.actions.get(&id).cloned())
    }

    async fn list_actions(
        &self,
        cafe_id: Option<CafeId>,
        scope: ReadScope,
    ) -> Result<Vec<Action>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .actions
            .values()
            .filter(|a| cafe_id.map_or(true, |id| a.cafe_id == id) && scope.admits(a.active))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingReader for InMemoryStore {
    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        Ok(self.state.lock().await.bookings.get(&id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }
}
