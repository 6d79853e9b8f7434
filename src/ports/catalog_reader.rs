//! Catalog reader port (read side).
//!
//! Plain reads of cafes and their child resources, outside any unit of
//! work. The `ReadScope` argument filters on each row's own `active`
//! flag; handlers apply the visibility policy on top.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::catalog::{Action, Cafe, Dish, Table};
use crate::domain::foundation::{
    ActionId, CafeId, DishId, DomainError, ReadScope, SlotId, TableId,
};
use crate::domain::schedule::TimeSlot;

#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn get_cafe(&self, id: CafeId) -> Result<Option<Cafe>, DomainError>;

    /// Cafes ordered by id.
    async fn list_cafes(&self, scope: ReadScope) -> Result<Vec<Cafe>, DomainError>;

    async fn get_table(&self, id: TableId) -> Result<Option<Table>, DomainError>;

    async fn list_tables(&self, cafe_id: CafeId, scope: ReadScope) -> Result<Vec<Table>, DomainError>;

    async fn get_slot(&self, id: SlotId) -> Result<Option<TimeSlot>, DomainError>;

    /// Slots of a cafe on one date, ordered by start time.
    async fn list_slots(
        &self,
        cafe_id: CafeId,
        date: NaiveDate,
        scope: ReadScope,
    ) -> Result<Vec<TimeSlot>, DomainError>;

    async fn get_dish(&self, id: DishId) -> Result<Option<Dish>, DomainError>;

    /// Dishes of one cafe, or of every cafe when `cafe_id` is `None`.
    async fn list_dishes(
        &self,
        cafe_id: Option<CafeId>,
        scope: ReadScope,
    ) -> Result<Vec<Dish>, DomainError>;

    async fn get_action(&self, id: ActionId) -> Result<Option<Action>, DomainError>;

    async fn list_actions(
        &self,
        cafe_id: Option<CafeId>,
        scope: ReadScope,
    ) -> Result<Vec<Action>, DomainError>;
}
