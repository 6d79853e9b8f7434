//! UpdateTableHandler - Command handler for editing tables.

use std::sync::Arc;

use crate::application::handlers::visibility::visible_cafe;
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::catalog::{Table, TablePatch};
use crate::domain::foundation::{
    require_manager_or_admin, Actor, CafeId, CommandMetadata, ServiceError, TableId,
};
use crate::ports::TransactionManager;

#[derive(Debug, Clone)]
pub struct UpdateTableCommand {
    pub cafe_id: CafeId,
    pub table_id: TableId,
    pub patch: TablePatch,
}

/// Handler for updating tables.
///
/// Existing bookings keep their tables; seat and active changes only
/// affect future availability checks.
pub struct UpdateTableHandler {
    transactions: Arc<dyn TransactionManager>,
    retry: RetryPolicy,
}

impl UpdateTableHandler {
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

    #[tracing::instrument(
        skip(self, cmd, metadata),
        fields(cafe_id = %cmd.cafe_id, table_id = %cmd.table_id)
    )]
    pub async fn handle(
        &self,
        cmd: UpdateTableCommand,
        metadata: CommandMetadata,
    ) -> Result<Table, ServiceError> {
        let actor = &metadata.actor;
        let table = with_retry(&self.retry, "update_table", || {
            self.attempt(&cmd, actor)
        })
        .await?;

        tracing::info!(table_id = %table.id, active = table.active, "table updated");
        Ok(table)
    }

    async fn attempt(
        &self,
        cmd: &UpdateTableCommand,
        actor: &Actor,
    ) -> Result<Table, ServiceError> {
        let mut uow = self.transactions.begin().await?;

        let cafe = visible_cafe(actor, cmd.cafe_id, uow.get_cafe(cmd.cafe_id).await?)?;
        require_manager_or_admin(actor, cafe.id)?;
        cmd.patch.validate()?;

        let mut table = uow
            .get_table(cmd.table_id)
            .await?
            .filter(|t| t.cafe_id == cafe.id)
            .ok_or_else(|| ServiceError::not_found_ids("Table", [cmd.table_id]))?;
        table.apply(cmd.patch.clone());
        uow.update_table(&table).await?;
        uow.commit().await?;
        Ok(table)
    }
}
