//! UpdateActionHandler - Command handler for editing promotions.

use std::sync::Arc;

use crate::application::handlers::visibility::{ensure_child_visible, visible_cafe};
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::catalog::{Action, ActionPatch};
use crate::domain::foundation::{
    require_manager_or_admin, ActionId, Actor, CommandMetadata, ServiceError,
};
use crate::ports::TransactionManager;

#[derive(Debug, Clone)]
pub struct UpdateActionCommand {
    pub action_id: ActionId,
    pub patch: ActionPatch,
}

/// Handler for updating promotions. Promotions hidden from the actor are
/// NotFound; a move between cafes needs scope over both.
pub struct UpdateActionHandler {
    transactions: Arc<dyn TransactionManager>,
    retry: RetryPolicy,
}

impl UpdateActionHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(action_id = %cmd.action_id))]
    pub async fn handle(
        &self,
        cmd: UpdateActionCommand,
        metadata: CommandMetadata,
    ) -> Result<Action, ServiceError> {
        let actor = &metadata.actor;
        cmd.patch.validate()?;

        let action = with_retry(&self.retry, "update_action", || {
            self.attempt(&cmd, actor)
        })
        .await?;
        tracing::info!(action_id = %action.id, active = action.active, "action updated");
        Ok(action)
    }

    async fn attempt(
        &self,
        cmd: &UpdateActionCommand,
        actor: &Actor,
    ) -> Result<Action, ServiceError> {
        let mut uow = self.transactions.begin().await?;

        let not_found = || ServiceError::not_found_ids("Action", [cmd.action_id]);
        let mut action = uow.get_action(cmd.action_id).await?.ok_or_else(not_found)?;
        let cafe = uow.get_cafe(action.cafe_id).await?.ok_or_else(not_found)?;
        ensure_child_visible(actor, &cafe, action.active, "Action", action.id)?;
        require_manager_or_admin(actor, action.cafe_id)?;

        if cmd.patch.cafe_id.changes(&action.cafe_id) {
            let target = cmd.patch.cafe_id.resolve_ref(&action.cafe_id);
            visible_cafe(actor, target, uow.get_cafe(target).await?)?;
            require_manager_or_admin(actor, target)?;
        }

        action.apply(cmd.patch.clone());
        uow.update_action(&action).await?;
        uow.commit().await?;
        Ok(action)
    }
}
