//! CreateBookingHandler - Command handler for reserving tables.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::application::availability::{validate_and_reserve, ReserveOptions};
use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::booking::{validate_guests, Booking, NewBooking, ReservationRequest};
use crate::domain::foundation::{
    CafeId, CommandMetadata, DishId, ServiceError, SlotId, TableId, UserId,
};
use crate::ports::{Clock, TransactionManager};

/// Command to reserve tables for one or more slots of a date.
#[derive(Debug, Clone)]
pub struct CreateBookingCommand {
    pub cafe_id: CafeId,
    pub table_ids: BTreeSet<TableId>,
    pub slot_ids: BTreeSet<SlotId>,
    pub dish_ids: BTreeSet<DishId>,
    pub guests_number: i32,
    pub note: Option<String>,
    /// When given, must equal the date of the requested slots.
    pub booking_date: Option<NaiveDate>,
}

/// Handler for creating bookings. The actor becomes the owner.
pub struct CreateBookingHandler {
    transactions: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl CreateBookingHandler {
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
        fields(cafe_id = %cmd.cafe_id, correlation_id = %metadata.correlation_id())
    )]
    pub async fn handle(
        &self,
        cmd: CreateBookingCommand,
        metadata: CommandMetadata,
    ) -> Result<Booking, ServiceError> {
        let user_id = metadata.actor.require_user()?;
        validate_guests(cmd.guests_number)?;

        let booking = with_retry(&self.retry, "create_booking", || {
            self.attempt(&cmd, user_id)
        })
        .await?;

        tracing::info!(
            booking_id = %booking.id,
            user_id = %user_id,
            date = %booking.booking_date,
            "booking created"
        );
        Ok(booking)
    }

    async fn attempt(
        &self,
        cmd: &CreateBookingCommand,
        user_id: UserId,
    ) -> Result<Booking, ServiceError> {
        let request = ReservationRequest {
            cafe_id: cmd.cafe_id,
            table_ids: cmd.table_ids.clone(),
            slot_ids: cmd.slot_ids.clone(),
            dish_ids: cmd.dish_ids.clone(),
            party_size: cmd.guests_number,
        };
        let options = ReserveOptions::new(self.clock.today()).expecting(cmd.booking_date);

        let mut uow = self.transactions.begin().await?;
        let reservation = validate_and_reserve(uow.as_mut(), &request, options).await?;

        let booking = uow
            .insert_booking(NewBooking {
                user_id,
                cafe_id: reservation.cafe_id,
                booking_date: reservation.booking_date,
                guests_number: cmd.guests_number,
                note: cmd.note.clone(),
                table_ids: reservation.table_ids,
                slot_ids: reservation.slot_ids,
                dish_ids: reservation.dish_ids,
            })
            .await?;
        uow.commit().await?;
        Ok(booking)
    }
}
