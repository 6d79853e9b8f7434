//! Booking lifecycle status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Status of a booking.
///
/// ```text
/// Booked ──cancel──► Cancelled
///   │                   ▲
///   └──check-in──► Active ──cancel──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Booked,
    Active,
    Cancelled,
}

impl BookingStatus {
    /// Booked and Active still occupy their tables.
    pub fn holds_reservation(&self) -> bool {
        matches!(self, BookingStatus::Booked | BookingStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::Active => "active",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for BookingStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use BookingStatus::*;
        matches!(
            (self, target),
            (Booked, Cancelled) | (Booked, Active) | (Active, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use BookingStatus::*;
        match self {
            Booked => vec![Active, Cancelled],
            Active => vec![Cancelled],
            Cancelled => vec![],
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(BookingStatus::Booked),
            "active" => Ok(BookingStatus::Active),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown booking status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_terminal() {
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Cancelled
            .transition_to(BookingStatus::Booked)
            .is_err());
    }

    #[test]
    fn active_cannot_return_to_booked() {
        assert!(BookingStatus::Active
            .transition_to(BookingStatus::Booked)
            .is_err());
    }

    #[test]
    fn booked_can_check_in_or_cancel() {
        assert_eq!(
            BookingStatus::Booked.transition_to(BookingStatus::Active),
            Ok(BookingStatus::Active)
        );
        assert_eq!(
            BookingStatus::Booked.transition_to(BookingStatus::Cancelled),
            Ok(BookingStatus::Cancelled)
        );
    }

    #[test]
    fn only_booked_and_active_hold_reservations() {
        assert!(BookingStatus::Booked.holds_reservation());
        assert!(BookingStatus::Active.holds_reservation());
        assert!(!BookingStatus::Cancelled.holds_reservation());
    }

    #[test]
    fn parses_storage_representation() {
        for status in [BookingStatus::Booked, BookingStatus::Active, BookingStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
        assert!("pending".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
