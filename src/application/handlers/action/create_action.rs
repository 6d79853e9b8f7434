//! CreateActionHandler - Command handler for publishing promotions.

use std::sync::Arc;

use crate::application::handlers::visibility::visible_cafe;
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::catalog::{Action, NewAction};
use crate::domain::foundation::{require_manager_or_admin, Actor, CommandMetadata, ServiceError};
use crate::ports::TransactionManager;

#[derive(Debug, Clone)]
pub struct CreateActionCommand {
    pub action: NewAction,
}

pub struct CreateActionHandler {
    transactions: Arc<dyn TransactionManager>,
    retry: RetryPolicy,
}

impl CreateActionHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(cafe_id = %cmd.action.cafe_id))]
    pub async fn handle(
        &self,
        cmd: CreateActionCommand,
        metadata: CommandMetadata,
    ) -> Result<Action, ServiceError> {
        let actor = &metadata.actor;
        let action = with_retry(&self.retry, "create_action", || {
            self.attempt(&cmd, actor)
        })
        .await?;

        tracing::info!(action_id = %action.id, "action created");
        Ok(action)
    }

    async fn attempt(
        &self,
        cmd: &CreateActionCommand,
        actor: &Actor,
    ) -> Result<Action, ServiceError> {
        let mut uow = self.transactions.begin().await?;

        let cafe_id = cmd.action.cafe_id;
        let cafe = visible_cafe(actor, cafe_id, uow.get_cafe(cafe_id).await?)?;
        require_manager_or_admin(actor, cafe.id)?;
        cmd.action.validate()?;

        let action = uow.insert_action(cmd.action.clone()).await?;
        uow.commit().await?;
        Ok(action)
    }
}
