//! Time slot queries.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::application::handlers::visibility::{ensure_child_visible, visible_cafe};
use crate::domain::foundation::{
    visibility_policy, CafeId, CommandMetadata, ResourceScope, ServiceError, SlotId,
};
use crate::domain::schedule::TimeSlot;
use crate::ports::{CatalogReader, Clock};

#[derive(Debug, Clone)]
pub struct GetTimeSlotQuery {
    pub cafe_id: CafeId,
    pub slot_id: SlotId,
}

/// Query for a cafe's slots on one date; today when no date is given.
#[derive(Debug, Clone)]
pub struct ListTimeSlotsQuery {
    pub cafe_id: CafeId,
    pub date: Option<NaiveDate>,
}

pub struct GetTimeSlotHandler {
    reader: Arc<dyn CatalogReader>,
}

impl GetTimeSlotHandler {
    pub fn new(reader: Arc<dyn CatalogReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetTimeSlotQuery,
        metadata: CommandMetadata,
    ) -> Result<TimeSlot, ServiceError> {
        let actor = &metadata.actor;
        let cafe = visible_cafe(actor, query.cafe_id, self.reader.get_cafe(query.cafe_id).await?)?;
        let slot = self
            .reader
            .get_slot(query.slot_id)
            .await?
            .filter(|s| s.cafe_id == cafe.id)
            .ok_or_else(|| ServiceError::not_found_ids("TimeSlot", [query.slot_id]))?;
        ensure_child_visible(actor, &cafe, slot.active, "TimeSlot", slot.id)?;
        Ok(slot)
    }
}

/// Lists slots ordered by start time. Managers see inactive slots too.
pub struct ListTimeSlotsHandler {
    reader: Arc<dyn CatalogReader>,
    clock: Arc<dyn Clock>,
}

impl ListTimeSlotsHandler {
    pub fn new(reader: Arc<dyn CatalogReader>, clock: Arc<dyn Clock>) -> Self {
        Self { reader, clock }
    }

    pub async fn handle(
        &self,
        query: ListTimeSlotsQuery,
        metadata: CommandMetadata,
    ) -> Result<Vec<TimeSlot>, ServiceError> {
        let actor = &metadata.actor;
        let cafe = visible_cafe(actor, query.cafe_id, self.reader.get_cafe(query.cafe_id).await?)?;
        let date = query.date.unwrap_or_else(|| self.clock.today());
        let scope = visibility_policy(actor, &ResourceScope::cafe(cafe.id));
        Ok(self.reader.list_slots(cafe.id, date, scope).await?)
    }
}
