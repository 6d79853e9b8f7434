//! Tables of the in-memory store.

use std::collections::BTreeMap;

use crate::domain::booking::Booking;
use crate::domain::catalog::{Action, Cafe, Dish, Table};
use crate::domain::foundation::{
    ActionId, BookingId, CafeId, DishId, DomainError, ErrorCode, SlotId, TableId, UserId,
};
use crate::domain::schedule::TimeSlot;
use crate::domain::user::User;

/// Everything the store holds. Cloned wholesale into each unit of work.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    pub cafes: BTreeMap<CafeId, Cafe>,
    pub users: BTreeMap<UserId, User>,
    pub tables: BTreeMap<TableId, Table>,
    pub slots: BTreeMap<SlotId, TimeSlot>,
    pub dishes: BTreeMap<DishId, Dish>,
    pub actions: BTreeMap<ActionId, Action>,
    pub bookings: BTreeMap<BookingId, Booking>,
    /// Unique (table, slot) claims of live bookings.
    pub claims: BTreeMap<(TableId, SlotId), BookingId>,
    last_id: i64,
}

impl StoreState {
    /// One sequence shared by every table, like a database serial.
    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Reserves an id for a row inserted with an explicit key.
    pub fn observe_id(&mut self, id: i64) {
        self.last_id = self.last_id.max(id);
    }

    /// A user with `managed_cafe_ids` derived from the cafe manager sets.
    pub fn user_with_managed_cafes(&self, id: UserId) -> Option<User> {
        let mut user = self.users.get(&id)?.clone();
        user.managed_cafe_ids = self
            .cafes
            .values()
            .filter(|cafe| cafe.is_managed_by(id))
            .map(|cafe| cafe.id)
            .collect();
        Some(user)
    }

    /// Replaces the claims of `booking` with the ones it holds now.
    ///
    /// Fails without touching anything when another booking already holds
    /// one of the pairs.
    pub fn rewrite_claims(&mut self, booking: &Booking) -> Result<(), DomainError> {
        let wanted = booking.claims();
        if let Some((pair, holder)) = wanted.iter().find_map(|pair| {
            self.claims
                .get(pair)
                .filter(|holder| **holder != booking.id)
                .map(|holder| (pair, *holder))
        }) {
            return Err(DomainError::new(
                ErrorCode::BookingConflict,
                "selected tables or time already taken",
            )
            .with_detail("table_id", pair.0.to_string())
            .with_detail("slot_id", pair.1.to_string())
            .with_detail("held_by", holder.to_string()));
        }

        self.claims.retain(|_, holder| *holder != booking.id);
        for pair in wanted {
            self.claims.insert(pair, booking.id);
        }
        Ok(())
    }
}
