//! Table queries.

use std::sync::Arc;

use crate::application::handlers::visibility::{ensure_child_visible, visible_cafe};
use crate::domain::catalog::Table;
use crate::domain::foundation::{
    visibility_policy, CafeId, CommandMetadata, ResourceScope, ServiceError, TableId,
};
use crate::ports::CatalogReader;

#[derive(Debug, Clone)]
pub struct GetTableQuery {
    pub cafe_id: CafeId,
    pub table_id: TableId,
}

#[derive(Debug, Clone)]
pub struct ListTablesQuery {
    pub cafe_id: CafeId,
}

pub struct GetTableHandler {
    reader: Arc<dyn CatalogReader>,
}

impl GetTableHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetTableQuery,
        metadata: CommandMetadata,
    ) -> Result<Table, ServiceError> {
        let actor = &metadata.actor;
        let cafe = visible_cafe(actor, query.cafe_id, self.reader.get_cafe(query.cafe_id).await?)?;
        let table = self
            .reader
            .get_table(query.table_id)
            .await?
            .filter(|t| t.cafe_id == cafe.id)
            .ok_or_else(|| ServiceError::not_found_ids("Table", [query.table_id]))?;
        ensure_child_visible(actor, &cafe, table.active, "Table", table.id)?;
        Ok(table)
    }
}

/// Lists a cafe's tables; managers of the cafe also see inactive ones.
pub struct ListTablesHandler {
    reader: Arc<dyn CatalogReader>,
}

impl ListTablesHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListTablesQuery,
        metadata: CommandMetadata,
    ) -> Result<Vec<Table>, ServiceError> {
        let actor = &metadata.actor;
        let cafe = visible_cafe(actor, query.cafe_id, self.reader.get_cafe(query.cafe_id).await?)?;
        let scope = visibility_policy(actor, &ResourceScope::cafe(cafe.id));
        Ok(self.reader.list_tables(cafe.id, scope).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::World;

    #[tokio::test]
    async fn inactive_table_hidden_from_customer_only() {
        let world = World::new().await;
        let handler = GetTableHandler::new(world.store.clone());
        let query = GetTableQuery {
            cafe_id: world.cafe,
            table_id: world.hidden_table,
        };

        assert_eq!(
            handler.handle(query.clone(), world.as_customer()).await,
            Err(ServiceError::not_found_ids("Table", [world.hidden_table]))
        );
        assert!(handler.handle(query, world.as_manager()).await.is_ok());
    }

    #[tokio::test]
    async fn listing_respects_visibility() {
        let world = World::new().await;
        let handler = ListTablesHandler::new(world.store.clone());
        let query = ListTablesQuery { cafe_id: world.cafe };

        let customer = handler.handle(query.clone(), world.as_customer()).await.unwrap();
        assert_eq!(customer.len(), 2);
        assert!(customer.iter().all(|t| t.active));

        let admin = handler.handle(query, world.as_admin()).await.unwrap();
        assert_eq!(admin.len(), 3);
    }

    #[tokio::test]
    async fn tables_of_closed_cafe_are_not_found_for_customer() {
        let world = World::new().await;
        let handler = ListTablesHandler::new(world.store.clone());

        let result = handler
            .handle(
                ListTablesQuery {
                    cafe_id: world.closed_cafe,
                },
                world.as_customer(),
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound { resource: "Cafe", .. })));
    }
}
