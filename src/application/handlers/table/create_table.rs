//! CreateTableHandler - Command handler for adding tables to a cafe.

use std::sync::Arc;

use crate::application::handlers::visibility::visible_cafe;
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::catalog::{NewTable, Table};
use crate::domain::foundation::{require_manager_or_admin, Actor, CommandMetadata, ServiceError};
use crate::ports::TransactionManager;

#[derive(Debug, Clone)]
pub struct CreateTableCommand {
    pub table: NewTable,
}

/// Handler for creating tables. Managers of the cafe and superusers only.
pub struct CreateTableHandler {
    transactions: Arc<dyn TransactionManager>,
    retry: RetryPolicy,
}

impl CreateTableHandler {
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

    #[tracing::instrument(skip(self, cmd, metadata), fields(cafe_id = %cmd.table.cafe_id))]
    pub async fn handle(
        &self,
        cmd: CreateTableCommand,
        metadata: CommandMetadata,
    ) -> Result<Table, ServiceError> {
        let actor = &metadata.actor;
        let table = with_retry(&self.retry, "create_table", || {
            self.attempt(&cmd, actor)
        })
        .await?;

        tracing::info!(table_id = %table.id, seats = table.seats, "table created");
        Ok(table)
    }

    async fn attempt(
        &self,
        cmd: &CreateTableCommand,
        actor: &Actor,
    ) -> Result<Table, ServiceError> {
        let mut uow = self.transactions.begin().await?;

        let cafe_id = cmd.table.cafe_id;
        let cafe = visible_cafe(actor, cafe_id, uow.get_cafe(cafe_id).await?)?;
        require_manager_or_admin(actor, cafe.id)?;
        cmd.table.validate()?;

        let table = uow.insert_table(cmd.table.clone()).await?;
        uow.commit().await?;
        Ok(table)
    }
}
