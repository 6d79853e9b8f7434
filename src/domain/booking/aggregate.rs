//! Booking aggregate.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::BookingStatus;
use crate::domain::foundation::{
    BookingId, CafeId, CafeScoped, Closable, DishId, OwnedByUser, Patch, ResourceScope,
    ServiceError, SlotId, TableId, Timestamp, UserId,
};

/// A customer's reservation of tables for one or more slots of one date.
///
/// # Invariants
///
/// - every table and slot belongs to `cafe_id`
/// - every slot falls on `booking_date`
/// - `guests_number >= 1`
/// - while live, no other live booking shares a (table, slot) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub cafe_id: CafeId,
    pub booking_date: NaiveDate,
    pub guests_number: i32,
    pub status: BookingStatus,
    pub note: Option<String>,
    pub active: bool,
    pub table_ids: BTreeSet<TableId>,
    pub slot_ids: BTreeSet<SlotId>,
    pub dish_ids: BTreeSet<DishId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn from_new(id: BookingId, new: NewBooking) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id: new.user_id,
            cafe_id: new.cafe_id,
            booking_date: new.booking_date,
            guests_number: new.guests_number,
            status: BookingStatus::Booked,
            note: new.note,
            active: true,
            table_ids: new.table_ids,
            slot_ids: new.slot_ids,
            dish_ids: new.dish_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Active and Booked/Active: the booking still occupies its tables.
    pub fn is_live(&self) -> bool {
        self.active && self.status.holds_reservation()
    }

    /// The (table, slot) pairs this booking holds; empty unless live.
    pub fn claims(&self) -> Vec<(TableId, SlotId)> {
        if !self.is_live() {
            return Vec::new();
        }
        self.table_ids
            .iter()
            .flat_map(|table| self.slot_ids.iter().map(move |slot| (*table, *slot)))
            .collect()
    }

    /// True when this booking holds any of `tables` in any of `slots`.
    pub fn claims_any(&self, tables: &BTreeSet<TableId>, slots: &BTreeSet<SlotId>) -> bool {
        self.is_live()
            && !self.table_ids.is_disjoint(tables)
            && !self.slot_ids.is_disjoint(slots)
    }

    pub fn scope(&self) -> ResourceScope {
        ResourceScope::owned(self.cafe_id, self.user_id)
    }

    /// Applies a patch whose reservation fields were already validated.
    ///
    /// `booking_date` is recomputed by the caller from the resolved slots.
    pub fn apply(&mut self, patch: BookingPatch, booking_date: NaiveDate) {
        self.cafe_id = patch.cafe_id.resolve(self.cafe_id);
        self.table_ids = patch.table_ids.resolve(std::mem::take(&mut self.table_ids));
        self.slot_ids = patch.slot_ids.resolve(std::mem::take(&mut self.slot_ids));
        self.dish_ids = patch.dish_ids.resolve(std::mem::take(&mut self.dish_ids));
        self.guests_number = patch.guests_number.resolve(self.guests_number);
        self.status = patch.status.resolve(self.status);
        self.note = patch.note.resolve(self.note.take());
        self.active = patch.active.resolve(self.active);
        self.booking_date = booking_date;
        self.updated_at = Timestamp::now();
    }
}

impl OwnedByUser for Booking {
    fn owner_id(&self) -> &UserId {
        &self.user_id
    }
}

impl CafeScoped for Booking {
    fn cafe_id(&self) -> CafeId {
        self.cafe_id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Closable for Booking {
    fn is_closed(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

pub fn validate_guests(guests_number: i32) -> Result<(), ServiceError> {
    if guests_number < 1 {
        return Err(ServiceError::validation(
            "guests_number",
            "at least one guest is required",
        ));
    }
    Ok(())
}

/// Draft of a booking that passed the availability checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub user_id: UserId,
    pub cafe_id: CafeId,
    pub booking_date: NaiveDate,
    pub guests_number: i32,
    pub note: Option<String>,
    pub table_ids: BTreeSet<TableId>,
    pub slot_ids: BTreeSet<SlotId>,
    pub dish_ids: BTreeSet<DishId>,
}

/// Partial update of a booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookingPatch {
    #[serde(default)]
    pub cafe_id: Patch<CafeId>,
    #[serde(default, rename = "tables")]
    pub table_ids: Patch<BTreeSet<TableId>>,
    #[serde(default, rename = "slots")]
    pub slot_ids: Patch<BTreeSet<SlotId>>,
    #[serde(default, rename = "dishes")]
    pub dish_ids: Patch<BTreeSet<DishId>>,
    #[serde(default)]
    pub guests_number: Patch<i32>,
    #[serde(default)]
    pub status: Patch<BookingStatus>,
    #[serde(default)]
    pub note: Patch<Option<String>>,
    #[serde(default)]
    pub active: Patch<bool>,
}

impl BookingPatch {
    /// Tables, slots, cafe or party size differ from the stored booking.
    pub fn changes_reservation(&self, booking: &Booking) -> bool {
        self.cafe_id.changes(&booking.cafe_id)
            || self.table_ids.changes(&booking.table_ids)
            || self.slot_ids.changes(&booking.slot_ids)
            || self.guests_number.changes(&booking.guests_number)
    }

    pub fn changes_dishes(&self, booking: &Booking) -> bool {
        self.dish_ids.changes(&booking.dish_ids)
    }

    /// Whether the booking is live once the patch is applied.
    pub fn leaves_live(&self, booking: &Booking) -> bool {
        self.active.resolve_ref(&booking.active)
            && self.status.resolve_ref(&booking.status).holds_reservation()
    }

    /// A dead booking would start holding tables again.
    pub fn revives(&self, booking: &Booking) -> bool {
        !booking.is_live() && self.leaves_live(booking)
    }
}
