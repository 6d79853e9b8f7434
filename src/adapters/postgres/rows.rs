//! Row to entity mapping.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Decode, Postgres, Row, Type};

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::catalog::{Action, Cafe, Dish, Table};
use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::schedule::TimeSlot;
use crate::domain::user::User;

/// Reads one column, naming it in the error.
pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(format!("Failed to get {}: {}", name, e)))
}

fn timestamp(row: &PgRow, name: &str) -> Result<Timestamp, DomainError> {
    let value: DateTime<Utc> = column(row, name)?;
    Ok(Timestamp::from_datetime(value))
}

fn id_set<T: From<i64> + Ord>(row: &PgRow, name: &str) -> Result<BTreeSet<T>, DomainError> {
    let ids: Vec<i64> = column(row, name)?;
    Ok(ids.into_iter().map(T::from).collect())
}

pub(crate) fn row_to_cafe(row: PgRow) -> Result<Cafe, DomainError> {
    Ok(Cafe {
        id: column::<i64>(&row, "id")?.into(),
        name: column(&row, "name")?,
        address: column(&row, "address")?,
        phone: column(&row, "phone")?,
        description: column(&row, "description")?,
        active: column(&row, "active")?,
        manager_ids: id_set(&row, "manager_ids")?,
        created_at: timestamp(&row, "created_at")?,
        updated_at: timestamp(&row, "updated_at")?,
    })
}

pub(crate) fn row_to_user(row: PgRow) -> Result<User, DomainError> {
    Ok(User {
        id: column::<i64>(&row, "id")?.into(),
        username: column(&row, "username")?,
        phone: column(&row, "phone")?,
        email: column(&row, "email")?,
        is_superuser: column(&row, "is_superuser")?,
        active: column(&row, "active")?,
        managed_cafe_ids: id_set(&row, "managed_cafe_ids")?,
    })
}

pub(crate) fn row_to_table(row: PgRow) -> Result<Table, DomainError> {
    Ok(Table {
        id: column::<i64>(&row, "id")?.into(),
        cafe_id: column::<i64>(&row, "cafe_id")?.into(),
        seats: column(&row, "seats")?,
        description: column(&row, "description")?,
        active: column(&row, "active")?,
        created_at: timestamp(&row, "created_at")?,
        updated_at: timestamp(&row, "updated_at")?,
    })
}

pub(crate) fn row_to_slot(row: PgRow) -> Result<TimeSlot, DomainError> {
    Ok(TimeSlot {
        id: column::<i64>(&row, "id")?.into(),
        cafe_id: column::<i64>(&row, "cafe_id")?.into(),
        date: column(&row, "slot_date")?,
        start_time: column(&row, "start_time")?,
        end_time: column(&row, "end_time")?,
        description: column(&row, "description")?,
        active: column(&row, "active")?,
        created_at: timestamp(&row, "created_at")?,
        updated_at: timestamp(&row, "updated_at")?,
    })
}

pub(crate) fn row_to_dish(row: PgRow) -> Result<Dish, DomainError> {
    Ok(Dish {
        id: column::<i64>(&row, "id")?.into(),
        cafe_id: column::<i64>(&row, "cafe_id")?.into(),
        name: column(&row, "name")?,
        price: column(&row, "price")?,
        description: column(&row, "description")?,
        active: column(&row, "active")?,
        created_at: timestamp(&row, "created_at")?,
        updated_at: timestamp(&row, "updated_at")?,
    })
}

pub(crate) fn row_to_action(row: PgRow) -> Result<Action, DomainError> {
    Ok(Action {
        id: column::<i64>(&row, "id")?.into(),
        cafe_id: column::<i64>(&row, "cafe_id")?.into(),
        description: column(&row, "description")?,
        active: column(&row, "active")?,
        created_at: timestamp(&row, "created_at")?,
        updated_at: timestamp(&row, "updated_at")?,
    })
}

pub(crate) fn row_to_booking(row: PgRow) -> Result<Booking, DomainError> {
    let status: String = column(&row, "status")?;
    let status: BookingStatus = status
        .parse()
        .map_err(|e| DomainError::database(format!("Invalid booking status in storage: {}", e)))?;

    Ok(Booking {
        id: column::<i64>(&row, "id")?.into(),
        user_id: column::<i64>(&row, "user_id")?.into(),
        cafe_id: column::<i64>(&row, "cafe_id")?.into(),
        booking_date: column(&row, "booking_date")?,
        guests_number: column(&row, "guests_number")?,
        status,
        note: column(&row, "note")?,
        active: column(&row, "active")?,
        table_ids: id_set(&row, "table_ids")?,
        slot_ids: id_set(&row, "slot_ids")?,
        dish_ids: id_set(&row, "dish_ids")?,
        created_at: timestamp(&row, "created_at")?,
        updated_at: timestamp(&row, "updated_at")?,
    })
}

/// Raw ids for binding as `BIGINT[]`.
pub(crate) fn raw_ids<T: Copy + Into<i64>>(ids: &BTreeSet<T>) -> Vec<i64> {
    ids.iter().map(|id| (*id).into()).collect()
}
