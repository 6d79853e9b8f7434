//! Availability engine.
//!
//! Runs the reservation checks against a unit of work, in order, failing
//! fast:
//!
//! 1. cafe exists and is active
//! 2. tables resolve (active, same cafe)
//! 3. seats cover the party
//! 4. slots resolve and share one date
//! 5. dishes resolve, when any were named
//! 6. cafe day locked, then no other live booking holds a requested
//!    (table, slot) combination
//!
//! The caller writes the booking on the same unit of work, so the conflict
//! scan and the write commit together.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::booking::{
    check_capacity, ensure_cafe_open, find_conflict, resolve_dishes, resolve_slots,
    resolve_tables, Reservation, ReservationRequest,
};
use crate::domain::foundation::{join_ids, BookingId, CafeId, DishId, ServiceError};
use crate::ports::UnitOfWork;

/// Date rules layered on top of the resource checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveOptions {
    /// Slots dated before this day are rejected.
    pub today: NaiveDate,
    /// Date the caller expects the slots to fall on, if it named one.
    pub expected_date: Option<NaiveDate>,
    /// The booking being edited; never conflicts with itself.
    pub exclude: Option<BookingId>,
}

impl ReserveOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            expected_date: None,
            exclude: None,
        }
    }

    pub fn expecting(mut self, date: Option<NaiveDate>) -> Self {
        self.expected_date = date;
        self
    }

    pub fn excluding(mut self, booking_id: BookingId) -> Self {
        self.exclude = Some(booking_id);
        self
    }
}

/// Validates a reservation request and scans for conflicts.
///
/// Leaves the cafe day locked on `uow` until it commits or rolls back.
pub async fn validate_and_reserve(
    uow: &mut dyn UnitOfWork,
    request: &ReservationRequest,
    options: ReserveOptions,
) -> Result<Reservation, ServiceError> {
    let cafe_id = request.cafe_id;
    let cafe = uow.get_cafe(cafe_id).await?;
    ensure_cafe_open(cafe_id, cafe)?;

    let tables = uow.get_tables_by_ids(cafe_id, &request.table_ids).await?;
    resolve_tables(cafe_id, &request.table_ids, &tables)?;

    let seats = check_capacity(&request.table_ids, &tables, request.party_size).map_err(|e| {
        tracing::info!(cafe_id = %cafe_id, party_size = request.party_size, "reservation rejected: capacity");
        e
    })?;

    let slots = uow.get_slots_by_ids(cafe_id, &request.slot_ids).await?;
    let booking_date = resolve_slots(cafe_id, &request.slot_ids, &slots)?;
    check_dates(booking_date, &options)?;

    check_dishes(uow, cafe_id, &request.dish_ids).await?;

    uow.lock_cafe_day(cafe_id, booking_date).await?;
    let existing = uow
        .get_live_bookings_for_slot_overlap(
            cafe_id,
            booking_date,
            &request.table_ids,
            &request.slot_ids,
            options.exclude,
        )
        .await?;
    if let Some(holder) = find_conflict(
        &request.table_ids,
        &request.slot_ids,
        &existing,
        options.exclude,
    ) {
        tracing::info!(
            cafe_id = %cafe_id,
            date = %booking_date,
            tables = %join_ids(request.table_ids.iter()),
            slots = %join_ids(request.slot_ids.iter()),
            held_by = %holder.id,
            "reservation rejected: conflict"
        );
        return Err(ServiceError::conflict("selected tables or time already taken"));
    }

    Ok(Reservation {
        cafe_id,
        booking_date,
        table_ids: request.table_ids.clone(),
        slot_ids: request.slot_ids.clone(),
        dish_ids: request.dish_ids.clone(),
        seats,
    })
}

/// Dish resolution on its own, for edits that only touch the pre-order.
pub async fn check_dishes(
    uow: &mut dyn UnitOfWork,
    cafe_id: CafeId,
    dish_ids: &BTreeSet<DishId>,
) -> Result<(), ServiceError> {
    if dish_ids.is_empty() {
        return Ok(());
    }
    let dishes = uow.get_dishes_by_ids(cafe_id, dish_ids).await?;
    resolve_dishes(cafe_id, dish_ids, &dishes)
}

fn check_dates(booking_date: NaiveDate, options: &ReserveOptions) -> Result<(), ServiceError> {
    if let Some(expected) = options.expected_date {
        if expected != booking_date {
            return Err(ServiceError::validation(
                "booking_date",
                format!(
                    "booking date {} does not match the slots' date {}",
                    expected, booking_date
                ),
            ));
        }
    }
    if booking_date < options.today {
        return Err(ServiceError::validation(
            "booking_date",
            "cannot book a date in the past",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStore;
    use crate::domain::booking::NewBooking;
    use crate::domain::catalog::{NewCafe, NewDish, NewTable};
    use crate::domain::foundation::{SlotId, TableId, UserId};
    use crate::domain::schedule::NewTimeSlot;
    use crate::ports::TransactionManager;
    use chrono::NaiveTime;

    struct Fixture {
        store: InMemoryStore,
        cafe: CafeId,
        t1: TableId,
        t2: TableId,
        s1: SlotId,
        s2: SlotId,
        s_other_day: SlotId,
        dish: DishId,
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn hour(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let cafe = uow
            .insert_cafe(NewCafe {
                name: "Central".to_string(),
                address: "1 Main St".to_string(),
                phone: "+100".to_string(),
                description: None,
                manager_ids: BTreeSet::new(),
            })
            .await
            .unwrap()
            .id;
        let table = |seats| NewTable {
            cafe_id: cafe,
            seats,
            description: None,
        };
        let t1 = uow.insert_table(table(4)).await.unwrap().id;
        let t2 = uow.insert_table(table(2)).await.unwrap().id;
        let slot = |day, h| NewTimeSlot {
            cafe_id: cafe,
            date: date(day),
            start_time: hour(h),
            end_time: hour(h + 1),
            description: None,
        };
        let s1 = uow.insert_slot(slot(10, 18)).await.unwrap().id;
        let s2 = uow.insert_slot(slot(10, 19)).await.unwrap().id;
        let s_other_day = uow.insert_slot(slot(11, 18)).await.unwrap().id;
        let dish = uow
            .insert_dish(NewDish {
                cafe_id: cafe,
                name: "Soup".to_string(),
                price: 300,
                description: None,
            })
            .await
            .unwrap()
            .id;
        uow.commit().await.unwrap();

        Fixture {
            store,
            cafe,
            t1,
            t2,
            s1,
            s2,
            s_other_day,
            dish,
        }
    }

    fn request(f: &Fixture, tables: &[TableId], slots: &[SlotId], party: i32) -> ReservationRequest {
        ReservationRequest {
            cafe_id: f.cafe,
            table_ids: tables.iter().copied().collect(),
            slot_ids: slots.iter().copied().collect(),
            dish_ids: BTreeSet::new(),
            party_size: party,
        }
    }

    async fn book(f: &Fixture, req: &ReservationRequest) -> Result<Reservation, ServiceError> {
        let mut uow = f.store.begin().await.unwrap();
        let reservation = validate_and_reserve(uow.as_mut(), req, ReserveOptions::new(date(1))).await?;
        uow.insert_booking(NewBooking {
            user_id: UserId::new(99),
            cafe_id: reservation.cafe_id,
            booking_date: reservation.booking_date,
            guests_number: req.party_size,
            note: None,
            table_ids: reservation.table_ids.clone(),
            slot_ids: reservation.slot_ids.clone(),
            dish_ids: reservation.dish_ids.clone(),
        })
        .await?;
        uow.commit().await?;
        Ok(reservation)
    }

    #[tokio::test]
    async fn same_table_and_slot_conflicts_but_other_slot_does_not() {
        let f = fixture().await;

        let a = book(&f, &request(&f, &[f.t1], &[f.s1], 3)).await.unwrap();
        assert_eq!(a.booking_date, date(10));
        assert_eq!(a.seats, 4);

        let b = book(&f, &request(&f, &[f.t1], &[f.s1], 2)).await;
        assert!(matches!(b, Err(ServiceError::Conflict(_))));

        assert!(book(&f, &request(&f, &[f.t1], &[f.s2], 2)).await.is_ok());
    }

    #[tokio::test]
    async fn capacity_is_checked_before_conflicts() {
        let f = fixture().await;
        book(&f, &request(&f, &[f.t2], &[f.s1], 2)).await.unwrap();

        let err = book(&f, &request(&f, &[f.t2], &[f.s1], 5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "guests_number"));
    }

    #[tokio::test]
    async fn mixed_dates_are_rejected() {
        let f = fixture().await;
        let err = book(&f, &request(&f, &[f.t1], &[f.s1, f.s_other_day], 2))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "slots"));
    }

    #[tokio::test]
    async fn unknown_cafe_is_not_found() {
        let f = fixture().await;
        let mut req = request(&f, &[f.t1], &[f.s1], 2);
        req.cafe_id = CafeId::new(999);

        let err = book(&f, &req).await.unwrap_err();
        assert_eq!(err, ServiceError::not_found_ids("Cafe", [999i64]));
    }

    #[tokio::test]
    async fn past_slot_date_is_rejected() {
        let f = fixture().await;
        let mut uow = f.store.begin().await.unwrap();
        let err = validate_and_reserve(
            uow.as_mut(),
            &request(&f, &[f.t1], &[f.s1], 2),
            ReserveOptions::new(date(20)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "booking_date"));
    }

    #[tokio::test]
    async fn explicit_date_must_match_slots() {
        let f = fixture().await;
        let mut uow = f.store.begin().await.unwrap();
        let err = validate_and_reserve(
            uow.as_mut(),
            &request(&f, &[f.t1], &[f.s1], 2),
            ReserveOptions::new(date(1)).expecting(Some(date(11))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn dishes_must_belong_to_the_cafe() {
        let f = fixture().await;
        let mut uow = f.store.begin().await.unwrap();

        let known: BTreeSet<DishId> = [f.dish].into_iter().collect();
        assert!(check_dishes(uow.as_mut(), f.cafe, &known).await.is_ok());

        let unknown: BTreeSet<DishId> = [DishId::new(404)].into_iter().collect();
        let err = check_dishes(uow.as_mut(), f.cafe, &unknown).await.unwrap_err();
        assert_eq!(err, ServiceError::not_found_ids("Dish", [404i64]));
    }

    #[tokio::test]
    async fn edited_booking_does_not_conflict_with_itself() {
        let f = fixture().await;
        book(&f, &request(&f, &[f.t1], &[f.s1], 2)).await.unwrap();

        let mut uow = f.store.begin().await.unwrap();
        let own = uow
            .get_live_bookings_for_slot_overlap(
                f.cafe,
                date(10),
                &[f.t1].into_iter().collect(),
                &[f.s1].into_iter().collect(),
                None,
            )
            .await
            .unwrap();
        let own_id = own[0].id;

        let result = validate_and_reserve(
            uow.as_mut(),
            &request(&f, &[f.t1], &[f.s1, f.s2], 2),
            ReserveOptions::new(date(1)).excluding(own_id),
        )
        .await;
        assert!(result.is_ok());
    }
}
