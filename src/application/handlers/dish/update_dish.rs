//! UpdateDishHandler - Command handler for editing dishes.

use std::sync::Arc;

use super::create_dish::ensure_unique_dish_name;
use crate::application::handlers::visibility::{ensure_child_visible, visible_cafe};
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::catalog::{Dish, DishPatch};
use crate::domain::foundation::{
    require_manager_or_admin, Actor, CommandMetadata, DishId, ServiceError,
};
use crate::ports::TransactionManager;

#[derive(Debug, Clone)]
pub struct UpdateDishCommand {
    pub dish_id: DishId,
    pub patch: DishPatch,
}

/// Handler for updating dishes.
///
/// A dish the actor cannot see is NotFound, never PermissionDenied.
/// Moving a dish to another cafe needs scope over both cafes.
pub struct UpdateDishHandler {
    transactions: Arc<dyn TransactionManager>,
    retry: RetryPolicy,
}

impl UpdateDishHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(dish_id = %cmd.dish_id))]
    pub async fn handle(
        &self,
        cmd: UpdateDishCommand,
        metadata: CommandMetadata,
    ) -> Result<Dish, ServiceError> {
        let actor = &metadata.actor;
        cmd.patch.validate()?;

        let dish = with_retry(&self.retry, "update_dish", || self.attempt(&cmd, actor)).await?;
        tracing::info!(dish_id = %dish.id, cafe_id = %dish.cafe_id, "dish updated");
        Ok(dish)
    }

    async fn attempt(
        &self,
        cmd: &UpdateDishCommand,
        actor: &Actor,
    ) -> Result<Dish, ServiceError> {
        let mut uow = self.transactions.begin().await?;

        let not_found = || ServiceError::not_found_ids("Dish", [cmd.dish_id]);
        let mut dish = uow.get_dish(cmd.dish_id).await?.ok_or_else(not_found)?;
        let cafe = uow.get_cafe(dish.cafe_id).await?.ok_or_else(not_found)?;
        ensure_child_visible(actor, &cafe, dish.active, "Dish", dish.id)?;
        require_manager_or_admin(actor, dish.cafe_id)?;

        let target_cafe = cmd.patch.cafe_id.resolve_ref(&dish.cafe_id);
        if target_cafe != dish.cafe_id {
            visible_cafe(actor, target_cafe, uow.get_cafe(target_cafe).await?)?;
            require_manager_or_admin(actor, target_cafe)?;
        }

        let name = cmd.patch.name.resolve_ref(&dish.name);
        if name != dish.name || target_cafe != dish.cafe_id {
            ensure_unique_dish_name(uow.as_mut(), target_cafe, &name, Some(dish.id)).await?;
        }

        dish.apply(cmd.patch.clone());
        uow.update_dish(&dish).await?;
        uow.commit().await?;
        Ok(dish)
    }
}
