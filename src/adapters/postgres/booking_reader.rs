//! PostgreSQL implementation of BookingReader.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::errors::db_error;
use super::queries::{self, SELECT_BOOKINGS};
use super::rows::{raw_ids, row_to_booking};
use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, DomainError, ReadScope};
use crate::ports::{BookingAudience, BookingFilter, BookingReader};

#[derive(Clone)]
pub struct PostgresBookingReader {
    pool: PgPool,
}

impl PostgresBookingReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Pushes a booking filter down into SQL.
fn build_listing(filter: &BookingFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_BOOKINGS);
    qb.push(" WHERE TRUE");

    if let BookingAudience::OwnerOrCafes { owner, cafe_ids } = &filter.audience {
        qb.push(" AND (b.user_id = ")
            .push_bind(owner.as_i64())
            .push(" OR b.cafe_id = ANY(")
            .push_bind(raw_ids(cafe_ids))
            .push("))");
    }
    if let Some(cafe_id) = filter.cafe_id {
        qb.push(" AND b.cafe_id = ").push_bind(cafe_id.as_i64());
    }
    if let Some(user_id) = filter.user_id {
        qb.push(" AND b.user_id = ").push_bind(user_id.as_i64());
    }
    if filter.scope == ReadScope::ActiveOnly {
        qb.push(" AND b.active");
    }
    qb.push(" ORDER BY b.id");
    qb
}

#[async_trait]
impl BookingReader for PostgresBookingReader {
    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        queries::fetch_booking(&mut conn, id).await
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DomainError> {
        let mut qb = build_listing(filter);
        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list bookings"))?;
        rows.into_iter().map(row_to_booking).collect()
    }
}
