//! SELECT statements shared by the readers and the unit of work.
//!
//! Association sets are folded into each row with `ARRAY(SELECT ...)` so
//! an entity always loads in one round trip.

use chrono::NaiveDate;
use sqlx::PgConnection;

use super::errors::db_error;
use super::rows::{
    row_to_action, row_to_booking, row_to_cafe, row_to_dish, row_to_slot, row_to_table,
};
use crate::domain::booking::Booking;
use crate::domain::catalog::{Action, Cafe, Dish, Table};
use crate::domain::foundation::{
    ActionId, BookingId, CafeId, DishId, DomainError, ReadScope, SlotId, TableId,
};
use crate::domain::schedule::TimeSlot;

pub(crate) const SELECT_CAFES: &str = r#"
    SELECT c.id, c.name, c.address, c.phone, c.description, c.active,
           c.created_at, c.updated_at,
           ARRAY(SELECT m.user_id FROM cafe_managers m
                 WHERE m.cafe_id = c.id ORDER BY m.user_id) AS manager_ids
    FROM cafes c
"#;

pub(crate) const SELECT_USERS: &str = r#"
    SELECT u.id, u.username, u.phone, u.email, u.is_superuser, u.active,
           ARRAY(SELECT m.cafe_id FROM cafe_managers m
                 WHERE m.user_id = u.id ORDER BY m.cafe_id) AS managed_cafe_ids
    FROM users u
"#;

pub(crate) const SELECT_TABLES: &str = r#"
    SELECT t.id, t.cafe_id, t.seats, t.description, t.active, t.created_at, t.updated_at
    FROM cafe_tables t
"#;

pub(crate) const SELECT_SLOTS: &str = r#"
    SELECT s.id, s.cafe_id, s.slot_date, s.start_time, s.end_time, s.description,
           s.active, s.created_at, s.updated_at
    FROM time_slots s
"#;

pub(crate) const SELECT_DISHES: &str = r#"
    SELECT d.id, d.cafe_id, d.name, d.price, d.description, d.active,
           d.created_at, d.updated_at
    FROM dishes d
"#;

pub(crate) const SELECT_ACTIONS: &str = r#"
    SELECT a.id, a.cafe_id, a.description, a.active, a.created_at, a.updated_at
    FROM actions a
"#;

pub(crate) const SELECT_BOOKINGS: &str = r#"
    SELECT b.id, b.user_id, b.cafe_id, b.booking_date, b.guests_number, b.status,
           b.note, b.active, b.created_at, b.updated_at,
           ARRAY(SELECT bt.table_id FROM booking_tables bt
                 WHERE bt.booking_id = b.id ORDER BY bt.table_id) AS table_ids,
           ARRAY(SELECT bs.slot_id FROM booking_slots bs
                 WHERE bs.booking_id = b.id ORDER BY bs.slot_id) AS slot_ids,
           ARRAY(SELECT bd.dish_id FROM booking_dishes bd
                 WHERE bd.booking_id = b.id ORDER BY bd.dish_id) AS dish_ids
    FROM bookings b
"#;

/// Predicate admitting the rows of `alias` that `scope` lets through.
pub(crate) fn scope_predicate(alias: &str, scope: ReadScope) -> String {
    match scope {
        ReadScope::ActiveOnly => format!("{}.active", alias),
        ReadScope::All => "TRUE".to_string(),
    }
}

pub(crate) async fn fetch_cafe(
    conn: &mut PgConnection,
    id: CafeId,
) -> Result<Option<Cafe>, DomainError> {
    let sql = format!("{} WHERE c.id = $1", SELECT_CAFES);
    let row = sqlx::query(&sql)
        .bind(id.as_i64())
        .fetch_optional(conn)
        .await
        .map_err(db_error("fetch cafe"))?;
    row.map(row_to_cafe).transpose()
}

pub(crate) async fn fetch_table(
    conn: &mut PgConnection,
    id: TableId,
) -> Result<Option<Table>, DomainError> {
    let sql = format!("{} WHERE t.id = $1", SELECT_TABLES);
    let row = sqlx::query(&sql)
        .bind(id.as_i64())
        .fetch_optional(conn)
        .await
        .map_err(db_error("fetch table"))?;
    row.map(row_to_table).transpose()
}

pub(crate) async fn fetch_slot(
    conn: &mut PgConnection,
    id: SlotId,
) -> Result<Option<TimeSlot>, DomainError> {
    let sql = format!("{} WHERE s.id = $1", SELECT_SLOTS);
    let row = sqlx::query(&sql)
        .bind(id.as_i64())
        .fetch_optional(conn)
        .await
        .map_err(db_error("fetch time slot"))?;
    row.map(row_to_slot).transpose()
}

pub(crate) async fn fetch_slots_on(
    conn: &mut PgConnection,
    cafe_id: CafeId,
    date: NaiveDate,
    scope: ReadScope,
) -> Result<Vec<TimeSlot>, DomainError> {
    let sql = format!(
        "{} WHERE s.cafe_id = $1 AND s.slot_date = $2 AND {} ORDER BY s.start_time, s.id",
        SELECT_SLOTS,
        scope_predicate("s", scope)
    );
    let rows = sqlx::query(&sql)
        .bind(cafe_id.as_i64())
        .bind(date)
        .fetch_all(conn)
        .await
        .map_err(db_error("fetch time slots"))?;
    rows.into_iter().map(row_to_slot).collect()
}

pub(crate) async fn fetch_dish(
    conn: &mut PgConnection,
    id: DishId,
) -> Result<Option<Dish>, DomainError> {
    let sql = format!("{} WHERE d.id = $1", SELECT_DISHES);
    let row = sqlx::query(&sql)
        .bind(id.as_i64())
        .fetch_optional(conn)
        .await
        .map_err(db_error("fetch dish"))?;
    row.map(row_to_dish).transpose()
}

pub(crate) async fn fetch_action(
    conn: &mut PgConnection,
    id: ActionId,
) -> Result<Option<Action>, DomainError> {
    let sql = format!("{} WHERE a.id = $1", SELECT_ACTIONS);
    let row = sqlx::query(&sql)
        .bind(id.as_i64())
        .fetch_optional(conn)
        .await
        .map_err(db_error("fetch action"))?;
    row.map(row_to_action).transpose()
}

pub(crate) async fn fetch_booking(
    conn: &mut PgConnection,
    id: BookingId,
) -> Result<Option<Booking>, DomainError> {
    let sql = format!("{} WHERE b.id = $1", SELECT_BOOKINGS);
    let row = sqlx::query(&sql)
        .bind(id.as_i64())
        .fetch_optional(conn)
        .await
        .map_err(db_error("fetch booking"))?;
    row.map(row_to_booking).transpose()
}
