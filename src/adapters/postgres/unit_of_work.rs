//! PostgreSQL unit of work.
//!
//! One `REPEATABLE READ` transaction per unit of work. Booking writes keep
//! `booking_claims` in step with the booking row, and the unique key on
//! that table is what finally rules out a double booking.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::errors::db_error;
use super::queries::{
    self, SELECT_BOOKINGS, SELECT_CAFES, SELECT_DISHES, SELECT_SLOTS, SELECT_TABLES, SELECT_USERS,
};
use super::rows::{
    column, raw_ids, row_to_booking, row_to_cafe, row_to_dish, row_to_slot, row_to_table,
    row_to_user,
};
use crate::domain::booking::{Booking, NewBooking};
use crate::domain::catalog::{Action, Cafe, Dish, NewAction, NewCafe, NewDish, NewTable, Table};
use crate::domain::foundation::{
    ActionId, BookingId, CafeId, DishId, DomainError, ErrorCode, ReadScope, SlotId, TableId,
    UserId,
};
use crate::domain::schedule::{NewTimeSlot, TimeSlot};
use crate::domain::user::User;
use crate::ports::{TransactionManager, UnitOfWork};

/// Opens PostgreSQL units of work.
#[derive(Clone)]
pub struct PostgresTransactionManager {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PostgresTransactionManager {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }
}

#[async_trait]
impl TransactionManager for PostgresTransactionManager {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("start transaction"))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .map_err(db_error("set isolation level"))?;

        // SET does not take bind parameters.
        let timeout = format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout.as_millis()
        );
        sqlx::query(&timeout)
            .execute(&mut *tx)
            .await
            .map_err(db_error("set statement timeout"))?;

        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

/// Advisory lock key for one cafe and date.
///
/// Distinct for every cafe id below 2^39; a collision would only make two
/// cafe days wait on each other.
pub(crate) fn cafe_day_lock_key(cafe_id: CafeId, date: NaiveDate) -> i64 {
    (cafe_id.as_i64().wrapping_shl(24)) ^ i64::from(date.num_days_from_ce())
}

pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

fn not_found(code: ErrorCode, what: &str, id: impl std::fmt::Display) -> DomainError {
    DomainError::new(code, format!("{} not found: {}", what, id))
}

async fn replace_cafe_managers(
    conn: &mut PgConnection,
    cafe_id: CafeId,
    manager_ids: &BTreeSet<UserId>,
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM cafe_managers WHERE cafe_id = $1")
        .bind(cafe_id.as_i64())
        .execute(&mut *conn)
        .await
        .map_err(db_error("clear cafe managers"))?;

    sqlx::query(
        r#"
        INSERT INTO cafe_managers (cafe_id, user_id)
        SELECT $1, u FROM UNNEST($2::BIGINT[]) AS u
        "#,
    )
    .bind(cafe_id.as_i64())
    .bind(raw_ids(manager_ids))
    .execute(&mut *conn)
    .await
    .map_err(db_error("insert cafe managers"))?;

    Ok(())
}

/// Rewrites the association tables and claims of one booking.
async fn replace_booking_links(conn: &mut PgConnection, booking: &Booking) -> Result<(), DomainError> {
    let id = booking.id.as_i64();

    for (table, column_name, ids, context) in [
        ("booking_tables", "table_id", raw_ids(&booking.table_ids), "link booking tables"),
        ("booking_slots", "slot_id", raw_ids(&booking.slot_ids), "link booking slots"),
        ("booking_dishes", "dish_id", raw_ids(&booking.dish_ids), "link booking dishes"),
    ] {
        let delete = format!("DELETE FROM {} WHERE booking_id = $1", table);
        sqlx::query(&delete)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(db_error(context))?;

        let insert = format!(
            "INSERT INTO {} (booking_id, {}) SELECT $1, x FROM UNNEST($2::BIGINT[]) AS x",
            table, column_name
        );
        sqlx::query(&insert)
            .bind(id)
            .bind(ids)
            .execute(&mut *conn)
            .await
            .map_err(db_error(context))?;
    }

    sqlx::query("DELETE FROM booking_claims WHERE booking_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(db_error("release booking claims"))?;

    let (tables, slots): (Vec<i64>, Vec<i64>) = booking
        .claims()
        .into_iter()
        .map(|(table, slot)| (table.as_i64(), slot.as_i64()))
        .unzip();
    if !tables.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO booking_claims (booking_id, table_id, slot_id)
            SELECT $1, t, s FROM UNNEST($2::BIGINT[], $3::BIGINT[]) AS c(t, s)
            "#,
        )
        .bind(id)
        .bind(tables)
        .bind(slots)
        .execute(&mut *conn)
        .await
        .map_err(db_error("claim tables"))?;
    }

    Ok(())
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn get_cafe(&mut self, id: CafeId) -> Result<Option<Cafe>, DomainError> {
        queries::fetch_cafe(&mut self.tx, id).await
    }

    async fn find_cafe_by_name(&mut self, name: &str) -> Result<Option<Cafe>, DomainError> {
        let sql = format!("{} WHERE c.name = $1", SELECT_CAFES);
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("find cafe by name"))?;
        row.map(row_to_cafe).transpose()
    }

    async fn get_users_by_ids(&mut self, ids: &BTreeSet<UserId>) -> Result<Vec<User>, DomainError> {
        let sql = format!("{} WHERE u.id = ANY($1) ORDER BY u.id", SELECT_USERS);
        let rows = sqlx::query(&sql)
            .bind(raw_ids(ids))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("fetch users"))?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn get_table(&mut self, id: TableId) -> Result<Option<Table>, DomainError> {
        queries::fetch_table(&mut self.tx, id).await
    }

    async fn get_tables_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<TableId>,
    ) -> Result<Vec<Table>, DomainError> {
        let sql = format!(
            "{} WHERE t.cafe_id = $1 AND t.id = ANY($2) ORDER BY t.id",
            SELECT_TABLES
        );
        let rows = sqlx::query(&sql)
            .bind(cafe_id.as_i64())
            .bind(raw_ids(ids))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("fetch tables"))?;
        rows.into_iter().map(row_to_table).collect()
    }

    async fn get_slot(&mut self, id: SlotId) -> Result<Option<TimeSlot>, DomainError> {
        queries::fetch_slot(&mut self.tx, id).await
    }

    async fn get_slots_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<SlotId>,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        let sql = format!(
            "{} WHERE s.cafe_id = $1 AND s.id = ANY($2) ORDER BY s.id",
            SELECT_SLOTS
        );
        let rows = sqlx::query(&sql)
            .bind(cafe_id.as_i64())
            .bind(raw_ids(ids))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("fetch time slots"))?;
        rows.into_iter().map(row_to_slot).collect()
    }

    async fn get_active_slots_on(
        &mut self,
        cafe_id: CafeId,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        queries::fetch_slots_on(&mut self.tx, cafe_id, date, ReadScope::ActiveOnly).await
    }

    async fn get_dish(&mut self, id: DishId) -> Result<Option<Dish>, DomainError> {
        queries::fetch_dish(&mut self.tx, id).await
    }

    async fn get_dishes_by_ids(
        &mut self,
        cafe_id: CafeId,
        ids: &BTreeSet<DishId>,
    ) -> Result<Vec<Dish>, DomainError> {
        let sql = format!(
            "{} WHERE d.cafe_id = $1 AND d.id = ANY($2) ORDER BY d.id",
            SELECT_DISHES
        );
        let rows = sqlx::query(&sql)
            .bind(cafe_id.as_i64())
            .bind(raw_ids(ids))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("fetch dishes"))?;
        rows.into_iter().map(row_to_dish).collect()
    }

    async fn find_dish_by_name(
        &mut self,
        cafe_id: CafeId,
        name: &str,
    ) -> Result<Option<Dish>, DomainError> {
        let sql = format!("{} WHERE d.cafe_id = $1 AND d.name = $2", SELECT_DISHES);
        let row = sqlx::query(&sql)
            .bind(cafe_id.as_i64())
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error("find dish by name"))?;
        row.map(row_to_dish).transpose()
    }

    async fn get_action(&mut self, id: ActionId) -> Result<Option<Action>, DomainError> {
        queries::fetch_action(&mut self.tx, id).await
    }

    async fn get_booking(&mut self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        queries::fetch_booking(&mut self.tx, id).await
    }

    async fn count_live_bookings_for_slot(&mut self, slot_id: SlotId) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM bookings b
            JOIN booking_slots bs ON bs.booking_id = b.id
            WHERE bs.slot_id = $1 AND b.active AND b.status <> 'cancelled'
            "#,
        )
        .bind(slot_id.as_i64())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("count bookings for slot"))?;

        Ok(count.max(0) as u64)
    }

    async fn lock_cafe_day(&mut self, cafe_id: CafeId, date: NaiveDate) -> Result<(), DomainError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(cafe_day_lock_key(cafe_id, date))
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("lock cafe day"))?;

        tracing::debug!(cafe_id = %cafe_id, %date, "cafe day locked");
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
        let sql = format!(
            r#"{}
            WHERE b.cafe_id = $1
              AND b.booking_date = $2
              AND b.active
              AND b.status <> 'cancelled'
              AND ($3::BIGINT IS NULL OR b.id <> $3)
              AND EXISTS (SELECT 1 FROM booking_tables bt
                          WHERE bt.booking_id = b.id AND bt.table_id = ANY($4))
              AND EXISTS (SELECT 1 FROM booking_slots bs
                          WHERE bs.booking_id = b.id AND bs.slot_id = ANY($5))
            ORDER BY b.id"#,
            SELECT_BOOKINGS
        );
        let rows = sqlx::query(&sql)
            .bind(cafe_id.as_i64())
            .bind(date)
            .bind(exclude.map(|id| id.as_i64()))
            .bind(raw_ids(table_ids))
            .bind(raw_ids(slot_ids))
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_error("scan booking conflicts"))?;
        rows.into_iter().map(row_to_booking).collect()
    }

    async fn insert_cafe(&mut self, new: NewCafe) -> Result<Cafe, DomainError> {
        let mut cafe = Cafe::from_new(CafeId::new(0), new);
        let row = sqlx::query(
            r#"
            INSERT INTO cafes (name, address, phone, description, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&cafe.name)
        .bind(&cafe.address)
        .bind(&cafe.phone)
        .bind(&cafe.description)
        .bind(cafe.active)
        .bind(cafe.created_at.as_datetime())
        .bind(cafe.updated_at.as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("insert cafe"))?;
        cafe.id = column::<i64>(&row, "id")?.into();

        replace_cafe_managers(&mut self.tx, cafe.id, &cafe.manager_ids).await?;
        Ok(cafe)
    }

    async fn update_cafe(&mut self, cafe: &Cafe) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE cafes SET
                name = $2,
                address = $3,
                phone = $4,
                description = $5,
                active = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(cafe.id.as_i64())
        .bind(&cafe.name)
        .bind(&cafe.address)
        .bind(&cafe.phone)
        .bind(&cafe.description)
        .bind(cafe.active)
        .bind(cafe.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update cafe"))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ErrorCode::CafeNotFound, "Cafe", cafe.id));
        }

        replace_cafe_managers(&mut self.tx, cafe.id, &cafe.manager_ids).await
    }

    async fn insert_table(&mut self, new: NewTable) -> Result<Table, DomainError> {
        let mut table = Table::from_new(TableId::new(0), new);
        let row = sqlx::query(
            r#"
            INSERT INTO cafe_tables (cafe_id, seats, description, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(table.cafe_id.as_i64())
        .bind(table.seats)
        .bind(&table.description)
        .bind(table.active)
        .bind(table.created_at.as_datetime())
        .bind(table.updated_at.as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("insert table"))?;
        table.id = column::<i64>(&row, "id")?.into();
        Ok(table)
    }

    async fn update_table(&mut self, table: &Table) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE cafe_tables SET
                seats = $2,
                description = $3,
                active = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(table.id.as_i64())
        .bind(table.seats)
        .bind(&table.description)
        .bind(table.active)
        .bind(table.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update table"))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ErrorCode::TableNotFound, "Table", table.id));
        }
        Ok(())
    }

    async fn insert_slot(&mut self, new: NewTimeSlot) -> Result<TimeSlot, DomainError> {
        let mut slot = TimeSlot::from_new(SlotId::new(0), new);
        let row = sqlx::query(
            r#"
            INSERT INTO time_slots (
                cafe_id, slot_date, start_time, end_time, description, active,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(slot.cafe_id.as_i64())
        .bind(slot.date)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(&slot.description)
        .bind(slot.active)
        .bind(slot.created_at.as_datetime())
        .bind(slot.updated_at.as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("insert time slot"))?;
        slot.id = column::<i64>(&row, "id")?.into();
        Ok(slot)
    }

    async fn update_slot(&mut self, slot: &TimeSlot) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE time_slots SET
                slot_date = $2,
                start_time = $3,
                end_time = $4,
                description = $5,
                active = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(slot.id.as_i64())
        .bind(slot.date)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(&slot.description)
        .bind(slot.active)
        .bind(slot.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update time slot"))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ErrorCode::SlotNotFound, "TimeSlot", slot.id));
        }
        Ok(())
    }

    async fn insert_dish(&mut self, new: NewDish) -> Result<Dish, DomainError> {
        let mut dish = Dish::from_new(DishId::new(0), new);
        let row = sqlx::query(
            r#"
            INSERT INTO dishes (cafe_id, name, price, description, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(dish.cafe_id.as_i64())
        .bind(&dish.name)
        .bind(dish.price)
        .bind(&dish.description)
        .bind(dish.active)
        .bind(dish.created_at.as_datetime())
        .bind(dish.updated_at.as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("insert dish"))?;
        dish.id = column::<i64>(&row, "id")?.into();
        Ok(dish)
    }

    async fn update_dish(&mut self, dish: &Dish) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE dishes SET
                cafe_id = $2,
                name = $3,
                price = $4,
                description = $5,
                active = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(dish.id.as_i64())
        .bind(dish.cafe_id.as_i64())
        .bind(&dish.name)
        .bind(dish.price)
        .bind(&dish.description)
        .bind(dish.active)
        .bind(dish.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update dish"))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ErrorCode::DishNotFound, "Dish", dish.id));
        }
        Ok(())
    }

    async fn insert_action(&mut self, new: NewAction) -> Result<Action, DomainError> {
        let mut action = Action::from_new(ActionId::new(0), new);
        let row = sqlx::query(
            r#"
            INSERT INTO actions (cafe_id, description, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(action.cafe_id.as_i64())
        .bind(&action.description)
        .bind(action.active)
        .bind(action.created_at.as_datetime())
        .bind(action.updated_at.as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("insert action"))?;
        action.id = column::<i64>(&row, "id")?.into();
        Ok(action)
    }

    async fn update_action(&mut self, action: &Action) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE actions SET
                cafe_id = $2,
                description = $3,
                active = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(action.id.as_i64())
        .bind(action.cafe_id.as_i64())
        .bind(&action.description)
        .bind(action.active)
        .bind(action.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update action"))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ErrorCode::ActionNotFound, "Action", action.id));
        }
        Ok(())
    }

    async fn insert_booking(&mut self, new: NewBooking) -> Result<Booking, DomainError> {
        let mut booking = Booking::from_new(BookingId::new(0), new);
        let row = sqlx::query(
            r#"
            INSERT INTO bookings (
                user_id, cafe_id, booking_date, guests_number, status, note, active,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(booking.user_id.as_i64())
        .bind(booking.cafe_id.as_i64())
        .bind(booking.booking_date)
        .bind(booking.guests_number)
        .bind(booking.status.as_str())
        .bind(&booking.note)
        .bind(booking.active)
        .bind(booking.created_at.as_datetime())
        .bind(booking.updated_at.as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("insert booking"))?;
        booking.id = column::<i64>(&row, "id")?.into();

        replace_booking_links(&mut self.tx, &booking).await?;
        Ok(booking)
    }

    async fn update_booking(&mut self, booking: &Booking) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET
                cafe_id = $2,
                booking_date = $3,
                guests_number = $4,
                status = $5,
                note = $6,
                active = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(booking.id.as_i64())
        .bind(booking.cafe_id.as_i64())
        .bind(booking.booking_date)
        .bind(booking.guests_number)
        .bind(booking.status.as_str())
        .bind(&booking.note)
        .bind(booking.active)
        .bind(booking.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("update booking"))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ErrorCode::BookingNotFound, "Booking", booking.id));
        }

        replace_booking_links(&mut self.tx, booking).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx.commit().await.map_err(db_error("commit transaction"))
    }
}
