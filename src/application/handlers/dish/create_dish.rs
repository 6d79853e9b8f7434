//! CreateDishHandler - Command handler for adding dishes to a menu.

use std::sync::Arc;

use crate::application::handlers::visibility::visible_cafe;
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::catalog::{Dish, NewDish};
use crate::domain::foundation::{
    require_manager_or_admin, Actor, CafeId, CommandMetadata, DishId, ServiceError,
};
use crate::ports::{TransactionManager, UnitOfWork};

#[derive(Debug, Clone)]
pub struct CreateDishCommand {
    pub dish: NewDish,
}

/// Handler for creating dishes. Names are unique within a cafe's menu.
pub struct CreateDishHandler {
    transactions: Arc<dyn TransactionManager>,
    retry: RetryPolicy,
}

impl CreateDishHandler {
    pub fn new(transactions: Arc<dyn TransactionManager>) -> Self {
        Self {
            transactions,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[tracing::instrument(skip(self, cmd, metadata), fields(cafe_id = %cmd.dish.cafe_id))]
    pub async fn handle(
        &self,
        cmd: CreateDishCommand,
        metadata: CommandMetadata,
    ) -> Result<Dish, ServiceError> {
        let actor = &metadata.actor;
        let dish = with_retry(&self.retry, "create_dish", || self.attempt(&cmd, actor)).await?;

        tracing::info!(dish_id = %dish.id, "dish created");
        Ok(dish)
    }

    async fn attempt(
        &self,
        cmd: &CreateDishCommand,
        actor: &Actor,
    ) -> Result<Dish, ServiceError> {
        let mut uow = self.transactions.begin().await?;

        let cafe_id = cmd.dish.cafe_id;
        let cafe = visible_cafe(actor, cafe_id, uow.get_cafe(cafe_id).await?)?;
        require_manager_or_admin(actor, cafe.id)?;
        cmd.dish.validate()?;
        ensure_unique_dish_name(uow.as_mut(), cafe.id, &cmd.dish.name, None).await?;

        let dish = uow.insert_dish(cmd.dish.clone()).await?;
        uow.commit().await?;
        Ok(dish)
    }
}

pub(super) async fn ensure_unique_dish_name(
    uow: &mut dyn UnitOfWork,
    cafe_id: CafeId,
    name: &str,
    exclude: Option<DishId>,
) -> Result<(), ServiceError> {
    match uow.find_dish_by_name(cafe_id, name).await? {
        Some(existing) if Some(existing.id) != exclude => Err(ServiceError::validation(
            "name",
            format!("dish '{}' is already on this menu", name),
        )),
        _ => Ok(()),
    }
}
