//! Booking reader port (read side / queries).

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::booking::Booking;
use crate::domain::foundation::{BookingId, CafeId, DomainError, ReadScope, UserId};

#[async_trait]
pub trait BookingReader: Send + Sync {
    async fn get_booking(&self, id: BookingId) -> Result<Option<Booking>, DomainError>;

    /// Bookings matching `filter`, ordered by id.
    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, DomainError>;
}

/// Whose bookings a listing may contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingAudience {
    /// Superusers see every booking.
    Everyone,
    /// Bookings owned by `owner` or placed in one of `cafe_ids`.
    OwnerOrCafes {
        owner: UserId,
        cafe_ids: BTreeSet<CafeId>,
    },
}

/// Filter for booking listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFilter {
    pub audience: BookingAudience,
    pub cafe_id: Option<CafeId>,
    pub user_id: Option<UserId>,
    /// `ActiveOnly` drops soft-deleted bookings.
    pub scope: ReadScope,
}

impl BookingFilter {
    pub fn new(audience: BookingAudience) -> Self {
        Self {
            audience,
            cafe_id: None,
            user_id: None,
            scope: ReadScope::ActiveOnly,
        }
    }

    pub fn with_cafe(mut self, cafe_id: Option<CafeId>) -> Self {
        self.cafe_id = cafe_id;
        self
    }

    pub fn with_user(mut self, user_id: Option<UserId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_scope(mut self, scope: ReadScope) -> Self {
        self.scope = scope;
        self
    }

    /// In-process evaluation, for adapters that cannot push it down.
    pub fn matches(&self, booking: &Booking) -> bool {
        let in_audience = match &self.audience {
            BookingAudience::Everyone => true,
            BookingAudience::OwnerOrCafes { owner, cafe_ids } => {
                booking.user_id == *owner || cafe_ids.contains(&booking.cafe_id)
            }
        };
        in_audience
            && self.cafe_id.map_or(true, |id| booking.cafe_id == id)
            && self.user_id.map_or(true, |id| booking.user_id == id)
            && self.scope.admits(booking.active)
    }
}
