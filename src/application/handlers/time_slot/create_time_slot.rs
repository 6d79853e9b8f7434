//! CreateTimeSlotHandler - Command handler for scheduling slots.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::application::handlers::visibility::visible_cafe;
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::foundation::{
    require_manager_or_admin, Actor, CafeId, CommandMetadata, ServiceError,
};
use crate::domain::schedule::{check_creation_time, find_overlap, NewTimeSlot, SlotWindow, TimeSlot};
use crate::ports::{Clock, TransactionManager};

/// Command to add a slot to a cafe's schedule.
#[derive(Debug, Clone)]
pub struct CreateTimeSlotCommand {
    pub cafe_id: CafeId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
}

/// Handler for creating time slots. Managers of the cafe and superusers only.
pub struct CreateTimeSlotHandler {
    transactions: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl CreateTimeSlotHandler {
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
        fields(cafe_id = %cmd.cafe_id, date = %cmd.date)
    )]
    pub async fn handle(
        &self,
        cmd: CreateTimeSlotCommand,
        metadata: CommandMetadata,
    ) -> Result<TimeSlot, ServiceError> {
        let window = SlotWindow::new(cmd.date, cmd.start_time, cmd.end_time)?;

        let slot = with_retry(&self.retry, "create_time_slot", || {
            self.attempt(&cmd, window, &metadata.actor)
        })
        .await?;

        tracing::info!(slot_id = %slot.id, "time slot created");
        Ok(slot)
    }

    async fn attempt(
        &self,
        cmd: &CreateTimeSlotCommand,
        window: SlotWindow,
        actor: &Actor,
    ) -> Result<TimeSlot, ServiceError> {
        let mut uow = self.transactions.begin().await?;

        let cafe = visible_cafe(actor, cmd.cafe_id, uow.get_cafe(cmd.cafe_id).await?)?;
        require_manager_or_admin(actor, cafe.id)?;
        check_creation_time(&window, self.clock.now())?;

        uow.lock_cafe_day(cafe.id, window.date()).await?;
        let siblings = uow.get_active_slots_on(cafe.id, window.date()).await?;
        if let Some(other) = find_overlap(&window, &siblings, None) {
            tracing::info!(overlaps = %other.id, "time slot rejected: overlap");
            return Err(ServiceError::conflict(format!(
                "time slot overlaps slot {} ({}-{})",
                other.id, other.start_time, other.end_time
            )));
        }

        let slot = uow
            .insert_slot(NewTimeSlot {
                cafe_id: cafe.id,
                date: window.date(),
                start_time: window.start(),
                end_time: window.end(),
                description: cmd.description.clone(),
            })
            .await?;
        uow.commit().await?;
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{at, day, World};

    fn command(world: &World, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> CreateTimeSlotCommand {
        CreateTimeSlotCommand {
            cafe_id: world.cafe,
            date,
            start_time: start,
            end_time: end,
            description: Some("late dinner".to_string()),
        }
    }

    fn handler(world: &World) -> CreateTimeSlotHandler {
        CreateTimeSlotHandler::new(world.store.clone(), world.clock.clone())
    }

    #[tokio::test]
    async fn manager_schedules_back_to_back_slot() {
        let world = World::new().await;
        let slot = handler(&world)
            .handle(command(&world, day(10), at(20, 0), at(21, 30)), world.as_manager())
            .await
            .unwrap();

        assert_eq!(slot.cafe_id, world.cafe);
        assert!(slot.active);
    }

    #[tokio::test]
    async fn overlapping_slot_conflicts() {
        let world = World::new().await;
        let result = handler(&world)
            .handle(command(&world, day(10), at(18, 30), at(19, 30)), world.as_manager())
            .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn same_time_on_another_day_is_fine() {
        let world = World::new().await;
        let result = handler(&world)
            .handle(command(&world, day(12), at(18, 0), at(19, 0)), world.as_admin())
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let world = World::new().await;
        let result = handler(&world)
            .handle(command(&world, day(12), at(19, 0), at(18, 0)), world.as_manager())
            .await;
        assert!(matches!(result, Err(ServiceError::Validation { ref field, .. }) if field == "end_time"));
    }

    #[tokio::test]
    async fn past_slot_is_rejected() {
        let world = World::new().await;
        let result = handler(&world)
            .handle(command(&world, day(5), at(11, 0), at(12, 30)), world.as_manager())
            .await;
        assert!(matches!(result, Err(ServiceError::Validation { ref field, .. }) if field == "date"));
    }

    #[tokio::test]
    async fn customer_is_denied() {
        let world = World::new().await;
        let result = handler(&world)
            .handle(command(&world, day(12), at(18, 0), at(19, 0)), world.as_customer())
            .await;
        assert_eq!(result, Err(ServiceError::PermissionDenied));
    }

    #[tokio::test]
    async fn closed_cafe_is_not_found_for_customer() {
        let world = World::new().await;
        let mut cmd = command(&world, day(12), at(18, 0), at(19, 0));
        cmd.cafe_id = world.closed_cafe;

        let result = handler(&world).handle(cmd, world.as_customer()).await;
        assert!(matches!(result, Err(ServiceError::NotFound { resource: "Cafe", .. })));
    }
}
