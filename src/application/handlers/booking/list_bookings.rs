//! ListBookingsHandler - Query handler for booking listings.

use std::sync::Arc;

use crate::domain::booking::Booking;
use crate::domain::foundation::{
    can_view_inactive_booking, require_superuser, CafeId, CommandMetadata, ReadScope,
    ServiceError, UserId,
};
use crate::ports::{BookingAudience, BookingFilter, BookingReader};

/// Query to list bookings visible to the actor.
#[derive(Debug, Clone, Default)]
pub struct ListBookingsQuery {
    /// Include soft-deleted bookings the actor may see.
    pub show_all: bool,
    pub cafe_id: Option<CafeId>,
    /// Superuser only.
    pub user_id: Option<UserId>,
}

/// Handler for booking listings.
///
/// Superusers see every booking, managers those of their cafes plus their
/// own, customers only their own.
pub struct ListBookingsHandler {
    reader: Arc<dyn BookingReader>,
}

impl ListBookingsHandler {
    pub fn new(reader: Arc<dyn BookingReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: ListBookingsQuery,
        metadata: CommandMetadata,
    ) -> Result<Vec<Booking>, ServiceError> {
        let actor = &metadata.actor;
        let owner = actor.require_user()?;
        if query.user_id.is_some() {
            require_superuser(actor)?;
        }

        let audience = if actor.is_superuser {
            BookingAudience::Everyone
        } else {
            BookingAudience::OwnerOrCafes {
                owner,
                cafe_ids: actor.managed_cafe_ids.clone(),
            }
        };
        let scope = if query.show_all {
            ReadScope::All
        } else {
            ReadScope::ActiveOnly
        };
        let filter = BookingFilter::new(audience)
            .with_cafe(query.cafe_id)
            .with_user(query.user_id)
            .with_scope(scope);

        let bookings = self.reader.list_bookings(&filter).await?;
        Ok(bookings
            .into_iter()
            .filter(|b| b.active || can_view_inactive_booking(actor, b))
            .collect())
    }
}
