//! Promotion queries.

use std::sync::Arc;

use crate::application::handlers::visibility::{
    ensure_child_visible, listing_scope, visible_cafe, CrossCafeFilter,
};
use crate::domain::catalog::Action;
use crate::domain::foundation::{ActionId, CafeId, CommandMetadata, ReadScope, ServiceError};
use crate::ports::CatalogReader;

#[derive(Debug, Clone)]
pub struct GetActionQuery {
    pub action_id: ActionId,
}

#[derive(Debug, Clone, Default)]
pub struct ListActionsQuery {
    pub cafe_id: Option<CafeId>,
    pub show_all: bool,
}

pub struct GetActionHandler {
    reader: Arc<dyn CatalogReader>,
}

impl GetActionHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetActionQuery,
        metadata: CommandMetadata,
    ) -> Result<Action, ServiceError> {
        let not_found = || ServiceError::not_found_ids("Action", [query.action_id]);
        let action = self
            .reader
            .get_action(query.action_id)
            .await?
            .ok_or_else(not_found)?;
        let cafe = self.reader.get_cafe(action.cafe_id).await?.ok_or_else(not_found)?;
        ensure_child_visible(&metadata.actor, &cafe, action.active, "Action", action.id)?;
        Ok(action)
    }
}

pub struct ListActionsHandler {
    reader: Arc<dyn CatalogReader>,
}

impl ListActionsHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListActionsQuery,
        metadata: CommandMetadata,
    ) -> Result<Vec<Action>, ServiceError> {
        let actor = &metadata.actor;
        if let Some(cafe_id) = query.cafe_id {
            let cafe = visible_cafe(actor, cafe_id, self.reader.get_cafe(cafe_id).await?)?;
            let scope = listing_scope(actor, cafe.id, query.show_all);
            return Ok(self.reader.list_actions(Some(cafe.id), scope).await?);
        }

        let cafes = self.reader.list_cafes(ReadScope::All).await?;
        let filter = CrossCafeFilter::new(actor, &cafes, query.show_all);
        let mut actions = self.reader.list_actions(None, ReadScope::All).await?;
        actions.retain(|a| filter.admits(a.cafe_id, a.active));
        Ok(actions)
    }
}
