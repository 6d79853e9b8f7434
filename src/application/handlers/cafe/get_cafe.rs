//! Cafe queries.

use std::sync::Arc;

use crate::application::handlers::visibility::visible_cafe;
use crate::domain::catalog::Cafe;
use crate::domain::foundation::{
    is_visible, CafeId, CommandMetadata, ReadScope, ResourceScope, ServiceError,
};
use crate::ports::CatalogReader;

#[derive(Debug, Clone)]
pub struct GetCafeQuery {
    pub cafe_id: CafeId,
}

#[derive(Debug, Clone, Default)]
pub struct ListCafesQuery {
    /// Include inactive cafes the actor administers.
    pub show_all: bool,
}

pub struct GetCafeHandler {
    reader: Arc<dyn CatalogReader>,
}

impl GetCafeHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetCafeQuery,
        metadata: CommandMetadata,
    ) -> Result<Cafe, ServiceError> {
        let cafe = self.reader.get_cafe(query.cafe_id).await?;
        visible_cafe(&metadata.actor, query.cafe_id, cafe)
    }
}

pub struct ListCafesHandler {
    reader: Arc<dyn CatalogReader>,
}

impl ListCafesHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListCafesQuery,
        metadata: CommandMetadata,
    ) -> Result<Vec<Cafe>, ServiceError> {
        if !query.show_all {
            return Ok(self.reader.list_cafes(ReadScope::ActiveOnly).await?);
        }
        let actor = &metadata.actor;
        Ok(self
            .reader
            .list_cafes(ReadScope::All)
            .await?
            .into_iter()
            .filter(|c| is_visible(actor, &ResourceScope::cafe(c.id), c.active))
            .collect())
    }
}
