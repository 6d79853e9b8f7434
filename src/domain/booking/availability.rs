//! Pure checks of the availability engine.
//!
//! Each function takes rows already loaded by the store and decides. The
//! async engine in the application layer calls them in order and stops at
//! the first failure.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::Booking;
use crate::domain::catalog::{Cafe, Dish, Table};
use crate::domain::foundation::{
    BookingId, CafeId, CafeScoped, DishId, ServiceError, SlotId, TableId,
};
use crate::domain::schedule::TimeSlot;

/// What a customer asks for, with ids deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub cafe_id: CafeId,
    pub table_ids: BTreeSet<TableId>,
    pub slot_ids: BTreeSet<SlotId>,
    pub dish_ids: BTreeSet<DishId>,
    pub party_size: i32,
}

/// Outcome of a successful availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub cafe_id: CafeId,
    /// The one date shared by every requested slot.
    pub booking_date: NaiveDate,
    pub table_ids: BTreeSet<TableId>,
    pub slot_ids: BTreeSet<SlotId>,
    pub dish_ids: BTreeSet<DishId>,
    pub seats: i64,
}

/// Bookings are customer-facing: an inactive cafe is never bookable.
pub fn ensure_cafe_open(cafe_id: CafeId, cafe: Option<Cafe>) -> Result<Cafe, ServiceError> {
    match cafe {
        Some(cafe) if cafe.active => Ok(cafe),
        _ => Err(ServiceError::not_found_ids("Cafe", [cafe_id])),
    }
}

/// Ids in `requested` with no active match in `cafe_id` among `found`.
fn unresolved<I, R>(cafe_id: CafeId, requested: &BTreeSet<I>, found: &[R], id_of: impl Fn(&R) -> I) -> Vec<I>
where
    I: Ord + Copy,
    R: CafeScoped,
{
    let resolved: BTreeSet<I> = found
        .iter()
        .filter(|row| row.is_reservable_in(cafe_id))
        .map(id_of)
        .collect();
    requested.difference(&resolved).copied().collect()
}

/// Every requested table exists, is active and belongs to the cafe.
pub fn resolve_tables(
    cafe_id: CafeId,
    requested: &BTreeSet<TableId>,
    found: &[Table],
) -> Result<(), ServiceError> {
    if requested.is_empty() {
        return Err(ServiceError::validation("tables", "at least one table is required"));
    }
    let missing = unresolved(cafe_id, requested, found, |t| t.id);
    if !missing.is_empty() {
        return Err(ServiceError::not_found_ids("Table", missing));
    }
    Ok(())
}

/// Total seats of the requested tables; fails when below `party_size`.
pub fn check_capacity(
    requested: &BTreeSet<TableId>,
    found: &[Table],
    party_size: i32,
) -> Result<i64, ServiceError> {
    let seats: i64 = found
        .iter()
        .filter(|t| requested.contains(&t.id))
        .map(|t| i64::from(t.seats))
        .sum();
    if seats < i64::from(party_size) {
        return Err(ServiceError::validation(
            "guests_number",
            format!(
                "capacity too small: {} seats for {} guests",
                seats, party_size
            ),
        ));
    }
    Ok(seats)
}

/// Every requested slot is active in the cafe and all share one date.
pub fn resolve_slots(
    cafe_id: CafeId,
    requested: &BTreeSet<SlotId>,
    found: &[TimeSlot],
) -> Result<NaiveDate, ServiceError> {
    if requested.is_empty() {
        return Err(ServiceError::validation("slots", "at least one time slot is required"));
    }
    let missing = unresolved(cafe_id, requested, found, |s| s.id);
    if !missing.is_empty() {
        return Err(ServiceError::not_found_ids("TimeSlot", missing));
    }
    let dates: BTreeSet<NaiveDate> = found
        .iter()
        .filter(|s| requested.contains(&s.id))
        .map(|s| s.date)
        .collect();
    let mut dates = dates.into_iter();
    match (dates.next(), dates.next()) {
        (Some(date), None) => Ok(date),
        (Some(_), Some(_)) => Err(ServiceError::validation(
            "slots",
            "all time slots of a booking must fall on the same date",
        )),
        (None, _) => Err(ServiceError::not_found_ids("TimeSlot", requested.iter().copied())),
    }
}

/// Pre-order is optional; any dish named must be active in the cafe.
pub fn resolve_dishes(
    cafe_id: CafeId,
    requested: &BTreeSet<DishId>,
    found: &[Dish],
) -> Result<(), ServiceError> {
    if requested.is_empty() {
        return Ok(());
    }
    let missing = unresolved(cafe_id, requested, found, |d| d.id);
    if !missing.is_empty() {
        return Err(ServiceError::not_found_ids("Dish", missing));
    }
    Ok(())
}

/// First other live booking holding a requested (table, slot) combination.
///
/// Sharing only a table, or only a slot, is not a conflict.
pub fn find_conflict<'a>(
    table_ids: &BTreeSet<TableId>,
    slot_ids: &BTreeSet<SlotId>,
    existing: &'a [Booking],
    exclude: Option<BookingId>,
) -> Option<&'a Booking> {
    existing
        .iter()
        .filter(|b| Some(b.id) != exclude)
        .find(|b| b.claims_any(table_ids, slot_ids))
}
