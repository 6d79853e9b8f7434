//! UpdateBookingHandler - Command handler for editing, checking in and
//! cancelling bookings.

use std::sync::Arc;

use crate::application::availability::{check_dishes, validate_and_reserve, ReserveOptions};
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::booking::{
    validate_guests, Booking, BookingPatch, BookingStatus, ReservationRequest,
};
use crate::domain::foundation::{
    can_edit_booking, can_view_inactive_booking, require_manager_or_admin, Actor, BookingId,
    CommandMetadata, ServiceError, StateMachine,
};
use crate::ports::{Clock, TransactionManager};

/// Command to patch a booking.
#[derive(Debug, Clone)]
pub struct UpdateBookingCommand {
    pub booking_id: BookingId,
    pub patch: BookingPatch,
}

/// Handler for updating bookings.
///
/// Reservation fields are re-validated only when they change, or when a
/// cancelled or soft-deleted booking would start holding tables again.
pub struct UpdateBookingHandler {
    transactions: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl UpdateBookingHandler {
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
        fields(booking_id = %cmd.booking_id, correlation_id = %metadata.correlation_id())
    )]
    pub async fn handle(
        &self,
        cmd: UpdateBookingCommand,
        metadata: CommandMetadata,
    ) -> Result<Booking, ServiceError> {
        metadata.actor.require_user()?;
        if let Some(guests) = cmd.patch.guests_number.as_set() {
            validate_guests(*guests)?;
        }

        let booking = with_retry(&self.retry, "update_booking", || {
            self.attempt(&cmd, &metadata.actor)
        })
        .await?;

        tracing::info!(
            booking_id = %booking.id,
            status = booking.status.as_str(),
            active = booking.active,
            "booking updated"
        );
        Ok(booking)
    }

    async fn attempt(
        &self,
        cmd: &UpdateBookingCommand,
        actor: &Actor,
    ) -> Result<Booking, ServiceError> {
        let today = self.clock.today();
        let mut uow = self.transactions.begin().await?;

        let mut booking = uow
            .get_booking(cmd.booking_id)
            .await?
            .filter(|b| can_view_inactive_booking(actor, b))
            .ok_or_else(|| ServiceError::not_found_ids("Booking", [cmd.booking_id]))?;

        if !can_edit_booking(actor, &booking) {
            tracing::warn!(
                booking_id = %booking.id,
                status = booking.status.as_str(),
                active = booking.active,
                "booking edit denied"
            );
            return Err(ServiceError::PermissionDenied);
        }
        if booking.booking_date < today {
            return Err(ServiceError::validation(
                "booking_date",
                "cannot modify past booking",
            ));
        }

        let patch = cmd.patch.clone();
        authorize_patch(actor, &booking, &patch)?;

        let mut booking_date = booking.booking_date;
        if patch.changes_reservation(&booking) || patch.revives(&booking) {
            let request = ReservationRequest {
                cafe_id: patch.cafe_id.resolve_ref(&booking.cafe_id),
                table_ids: patch.table_ids.resolve_ref(&booking.table_ids),
                slot_ids: patch.slot_ids.resolve_ref(&booking.slot_ids),
                dish_ids: patch.dish_ids.resolve_ref(&booking.dish_ids),
                party_size: patch.guests_number.resolve_ref(&booking.guests_number),
            };
            let options = ReserveOptions::new(today).excluding(booking.id);
            booking_date = validate_and_reserve(uow.as_mut(), &request, options)
                .await?
                .booking_date;
        } else if patch.changes_dishes(&booking) {
            let dish_ids = patch.dish_ids.resolve_ref(&booking.dish_ids);
            check_dishes(uow.as_mut(), booking.cafe_id, &dish_ids).await?;
        }

        booking.apply(patch, booking_date);
        uow.update_booking(&booking).await?;
        uow.commit().await?;
        Ok(booking)
    }
}

/// Status and cafe moves the actor is allowed to make.
///
/// Owners may only cancel; check-in needs cafe scope. Moving a booking to
/// another cafe on someone else's behalf needs scope over the target cafe.
fn authorize_patch(
    actor: &Actor,
    booking: &Booking,
    patch: &BookingPatch,
) -> Result<(), ServiceError> {
    if let Some(target) = patch.status.as_set() {
        let next = booking.status.transition_to(*target)?;
        if next != booking.status && next == BookingStatus::Active {
            require_manager_or_admin(actor, booking.cafe_id)?;
        }
    }
    if let Some(cafe_id) = patch.cafe_id.as_set() {
        if *cafe_id != booking.cafe_id && !actor.owns(booking) {
            require_manager_or_admin(actor, *cafe_id)?;
        }
    }
    Ok(())
}
