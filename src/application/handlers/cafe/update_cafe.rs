//! UpdateCafeHandler - Command handler for editing cafes.

use std::sync::Arc;

use super::create_cafe::{ensure_unique_name, ensure_users_exist};
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::catalog::{Cafe, CafePatch};
use crate::domain::foundation::{require_superuser, CafeId, CommandMetadata, ServiceError};
use crate::ports::TransactionManager;

#[derive(Debug, Clone)]
pub struct UpdateCafeCommand {
    pub cafe_id: CafeId,
    pub patch: CafePatch,
}

/// Handler for updating cafes. Superusers only; `managers` replaces the
/// whole manager set.
pub struct UpdateCafeHandler {
    transactions: Arc<dyn TransactionManager>,
    retry: RetryPolicy,
}

impl UpdateCafeHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(cafe_id = %cmd.cafe_id))]
    pub async fn handle(
        &self,
        cmd: UpdateCafeCommand,
        metadata: CommandMetadata,
    ) -> Result<Cafe, ServiceError> {
        require_superuser(&metadata.actor)?;
        cmd.patch.validate()?;

        let cafe = with_retry(&self.retry, "update_cafe", || self.attempt(&cmd)).await?;
        tracing::info!(cafe_id = %cafe.id, active = cafe.active, "cafe updated");
        Ok(cafe)
    }

    async fn attempt(&self, cmd: &UpdateCafeCommand) -> Result<Cafe, ServiceError> {
        let mut uow = self.transactions.begin().await?;
        let mut cafe = uow
            .get_cafe(cmd.cafe_id)
            .await?
            .ok_or_else(|| ServiceError::not_found_ids("Cafe", [cmd.cafe_id]))?;

        if let Some(name) = cmd.patch.name.as_set() {
            ensure_unique_name(uow.as_mut(), name, Some(cafe.id)).await?;
        }
        if let Some(managers) = cmd.patch.manager_ids.as_set() {
            ensure_users_exist(uow.as_mut(), managers).await?;
        }

        cafe.apply(cmd.patch.clone());
        uow.update_cafe(&cafe).await?;
        uow.commit().await?;
        Ok(cafe)
    }
}
