//! Strongly-typed identifier value objects.
//!
//! Every persisted entity is keyed by a database-assigned integer. Wrapping
//! each key in its own type keeps a `TableId` from being passed where a
//! `SlotId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database key.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database key.
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(
    /// Identifier of a cafe (the top-level scoping entity).
    CafeId
);
define_id!(
    /// Identifier of a table inside a cafe.
    TableId
);
define_id!(
    /// Identifier of a reservable time slot.
    SlotId
);
define_id!(
    /// Identifier of a menu dish.
    DishId
);
define_id!(
    /// Identifier of a booking.
    BookingId
);
define_id!(
    /// Identifier of a registered user.
    UserId
);
define_id!(
    /// Identifier of a cafe promotion.
    ActionId
);

/// Renders a list of ids for error details and log fields.
pub fn join_ids<T: fmt::Display>(ids: impl IntoIterator<Item = T>) -> String {
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
