//! GetBookingHandler - Query handler for booking detail.

use std::sync::Arc;

use crate::domain::booking::Booking;
use crate::domain::foundation::{
    can_view_inactive_booking, BookingId, CommandMetadata, ServiceError,
};
use crate::ports::BookingReader;

/// Query to retrieve one booking.
#[derive(Debug, Clone)]
pub struct GetBookingQuery {
    pub booking_id: BookingId,
}

/// Handler for booking detail.
///
/// Owners, managers of the booking's cafe and superusers see it; everyone
/// else gets `NotFound`, so existence is never revealed.
pub struct GetBookingHandler {
    reader: Arc<dyn BookingReader>,
}

impl GetBookingHandler {
    pub fn new(reader: Arc<dyn BookingReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetBookingQuery,
        metadata: CommandMetadata,
    ) -> Result<Booking, ServiceError> {
        self.reader
            .get_booking(query.booking_id)
            .await?
            .filter(|b| can_view_inactive_booking(&metadata.actor, b))
            .ok_or_else(|| ServiceError::not_found_ids("Booking", [query.booking_id]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{day, World};

    #[tokio::test]
    async fn owner_and_manager_see_booking() {
        let world = World::new().await;
        let booking = world
            .seed_booking(world.customer, day(10), &[world.t1], &[world.s1])
            .await;
        let handler = GetBookingHandler::new(world.store.clone());
        let query = GetBookingQuery {
            booking_id: booking.id,
        };

        assert_eq!(
            handler.handle(query.clone(), world.as_customer()).await,
            Ok(booking.clone())
        );
        assert_eq!(
            handler.handle(query, world.as_manager()).await,
            Ok(booking)
        );
    }

    #[tokio::test]
    async fn other_customer_gets_not_found() {
        let world = World::new().await;
        let booking = world
            .seed_booking(world.customer, day(10), &[world.t1], &[world.s1])
            .await;
        let handler = GetBookingHandler::new(world.store.clone());

        let result = handler
            .handle(
                GetBookingQuery {
                    booking_id: booking.id,
                },
                world.as_stranger(),
            )
            .await;
        assert_eq!(
            result,
            Err(ServiceError::not_found_ids("Booking", [booking.id]))
        );
    }

    #[tokio::test]
    async fn owner_still_sees_soft_deleted_booking() {
        let world = World::new().await;
        let mut booking = world
            .seed_booking(world.customer, day(10), &[world.t1], &[world.s1])
            .await;
        booking.active = false;
        world.overwrite_booking(&booking).await;

        let handler = GetBookingHandler::new(world.store.clone());
        let found = handler
            .handle(
                GetBookingQuery {
                    booking_id: booking.id,
                },
                world.as_customer(),
            )
            .await
            .unwrap();
        assert!(!found.active);
    }

    #[tokio::test]
    async fn missing_booking_is_not_found() {
        let world = World::new().await;
        let handler = GetBookingHandler::new(world.store.clone());
        let result = handler
            .handle(
                GetBookingQuery {
                    booking_id: BookingId::new(404),
                },
                world.as_admin(),
            )
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound { resource: "Booking", .. })));
    }
}
