//! Ownership traits shared by every entity type.
//!
//! - `OwnedByUser` for resources with a single owning user (bookings).
//! - `CafeScoped` for everything that lives under a cafe.
//!
//! The authorization evaluator is written against these traits so one
//! policy covers tables, slots, dishes, actions and bookings alike.

use super::{CafeId, UserId};

/// Trait for resources that have a single owner.
pub trait OwnedByUser {
    /// Returns the ID of the user who owns this resource.
    fn owner_id(&self) -> &UserId;

    /// Checks if the given user is the owner.
    fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }
}

/// Trait for resources that belong to exactly one cafe.
pub trait CafeScoped {
    fn cafe_id(&self) -> CafeId;

    /// The resource's own soft-delete flag.
    fn is_active(&self) -> bool;

    fn belongs_to(&self, cafe_id: CafeId) -> bool {
        self.cafe_id() == cafe_id
    }

    /// Usable for a reservation in `cafe_id`: right cafe and active.
    fn is_reservable_in(&self, cafe_id: CafeId) -> bool {
        self.belongs_to(cafe_id) && self.is_active()
    }
}
