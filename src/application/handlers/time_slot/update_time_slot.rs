//! UpdateTimeSlotHandler - Command handler for editing slots.

use std::sync::Arc;

use crate::application::handlers::visibility::visible_cafe;
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::foundation::{
    require_manager_or_admin, Actor, CafeId, CommandMetadata, ServiceError, SlotId,
};
use crate::domain::schedule::{
    check_reschedule_time, find_overlap, SlotWindow, TimeSlot, TimeSlotPatch,
};
use crate::ports::{Clock, TransactionManager};

/// Command to patch a slot of a cafe.
#[derive(Debug, Clone)]
pub struct UpdateTimeSlotCommand {
    pub cafe_id: CafeId,
    pub slot_id: SlotId,
    pub patch: TimeSlotPatch,
}

/// Handler for updating time slots.
///
/// A slot still held by a live booking cannot be edited at all.
pub struct UpdateTimeSlotHandler {
    transactions: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl UpdateTimeSlotHandler {
    pub fn new(transactions: Arc<dyn TransactionManager>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transactions,
            clock,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[tracing::instrument(
        skip(self, cmd, metadata),
        fields(cafe_id = %cmd.cafe_id, slot_id = %cmd.slot_id)
    )]
    pub async fn handle(
        &self,
        cmd: UpdateTimeSlotCommand,
        metadata: CommandMetadata,
    ) -> Result<TimeSlot, ServiceError> {
        let slot = with_retry(&self.retry, "update_time_slot", || {
            self.attempt(&cmd, &metadata.actor)
        })
        .await?;

        tracing::info!(slot_id = %slot.id, active = slot.active, "time slot updated");
        Ok(slot)
    }

    async fn attempt(
        &self,
        cmd: &UpdateTimeSlotCommand,
        actor: &Actor,
    ) -> Result<TimeSlot, ServiceError> {
        let mut uow = self.transactions.begin().await?;

        let cafe = visible_cafe(actor, cmd.cafe_id, uow.get_cafe(cmd.cafe_id).await?)?;
        require_manager_or_admin(actor, cafe.id)?;
        let mut slot = uow
            .get_slot(cmd.slot_id)
            .await?
            .filter(|s| s.cafe_id == cafe.id)
            .ok_or_else(|| ServiceError::not_found_ids("TimeSlot", [cmd.slot_id]))?;

        let (date, start, end) = slot.patched_window(&cmd.patch);
        let proposed = SlotWindow::new(date, start, end)?;
        check_reschedule_time(&slot.window(), &proposed, self.clock.now())?;

        // Booking writers lock the slot's current day; a move also locks
        // the target day. Lower date first.
        let mut days = vec![slot.date, proposed.date()];
        days.sort();
        days.dedup();
        for day in days {
            uow.lock_cafe_day(cafe.id, day).await?;
        }

        let live = uow.count_live_bookings_for_slot(slot.id).await?;
        if live > 0 {
            tracing::info!(live_bookings = live, "time slot edit rejected: booked");
            return Err(ServiceError::conflict(format!(
                "time slot {} has {} live booking(s)",
                slot.id, live
            )));
        }

        if cmd.patch.active.resolve_ref(&slot.active) {
            let siblings = uow.get_active_slots_on(cafe.id, proposed.date()).await?;
            if let Some(other) = find_overlap(&proposed, &siblings, Some(slot.id)) {
                return Err(ServiceError::conflict(format!(
                    "time slot overlaps slot {} ({}-{})",
                    other.id, other.start_time, other.end_time
                )));
            }
        }

        slot.apply(cmd.patch.clone());
        uow.update_slot(&slot).await?;
        uow.commit().await?;
        Ok(slot)
    }
}
