//! PostgreSQL implementation of CatalogReader.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::errors::db_error;
use super::queries::{
    self, scope_predicate, SELECT_ACTIONS, SELECT_CAFES, SELECT_DISHES, SELECT_TABLES,
};
use super::rows::{row_to_action, row_to_cafe, row_to_dish, row_to_table};
use crate::domain::catalog::{Action, Cafe, Dish, Table};
use crate::domain::foundation::{
    ActionId, CafeId, DishId, DomainError, ReadScope, SlotId, TableId,
};
use crate::domain::schedule::TimeSlot;
use crate::ports::CatalogReader;

/// Catalog queries outside any transaction.
#[derive(Clone)]
pub struct PostgresCatalogReader {
    pool: PgPool,
}

impl PostgresCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogReader for PostgresCatalogReader {
    async fn get_cafe(&self, id: CafeId) -> Result<Option<Cafe>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        queries::fetch_cafe(&mut conn, id).await
    }

    async fn list_cafes(&self, scope: ReadScope) -> Result<Vec<Cafe>, DomainError> {
        let sql = format!(
            "{} WHERE {} ORDER BY c.id",
            SELECT_CAFES,
            scope_predicate("c", scope)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list cafes"))?;
        rows.into_iter().map(row_to_cafe).collect()
    }

    async fn get_table(&self, id: TableId) -> Result<Option<Table>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        queries::fetch_table(&mut conn, id).await
    }

    async fn list_tables(&self, cafe_id: CafeId, scope: ReadScope) -> Result<Vec<Table>, DomainError> {
        let sql = format!(
            "{} WHERE t.cafe_id = $1 AND {} ORDER BY t.id",
            SELECT_TABLES,
            scope_predicate("t", scope)
        );
        let rows = sqlx::query(&sql)
            .bind(cafe_id.as_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list tables"))?;
        rows.into_iter().map(row_to_table).collect()
    }

    async fn get_slot(&self, id: SlotId) -> Result<Option<TimeSlot>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        queries::fetch_slot(&mut conn, id).await
    }

    async fn list_slots(
        &self,
        cafe_id: CafeId,
        date: NaiveDate,
        scope: ReadScope,
    ) -> Result<Vec<TimeSlot>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        queries::fetch_slots_on(&mut conn, cafe_id, date, scope).await
    }

    async fn get_dish(&self, id: DishId) -> Result<Option<Dish>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        queries::fetch_dish(&mut conn, id).await
    }

    async fn list_dishes(
        &self,
        cafe_id: Option<CafeId>,
        scope: ReadScope,
    ) -> Result<Vec<Dish>, DomainError> {
        let sql = format!(
            "{} WHERE ($1::BIGINT IS NULL OR d.cafe_id = $1) AND {} ORDER BY d.id",
            SELECT_DISHES,
            scope_predicate("d", scope)
        );
        let rows = sqlx::query(&sql)
            .bind(cafe_id.map(|id| id.as_i64()))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list dishes"))?;
        rows.into_iter().map(row_to_dish).collect()
    }

    async fn get_action(&self, id: ActionId) -> Result<Option<Action>, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(db_error("acquire connection"))?;
        queries::fetch_action(&mut conn, id).await
    }

    async fn list_actions(
        &self,
        cafe_id: Option<CafeId>,
        scope: ReadScope,
    ) -> Result<Vec<Action>, DomainError> {
        let sql = format!(
            "{} WHERE ($1::BIGINT IS NULL OR a.cafe_id = $1) AND {} ORDER BY a.id",
            SELECT_ACTIONS,
            scope_predicate("a", scope)
        );
        let rows = sqlx::query(&sql)
            .bind(cafe_id.map(|id| id.as_i64()))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list actions"))?;
        rows.into_iter().map(row_to_action).collect()
    }
}
