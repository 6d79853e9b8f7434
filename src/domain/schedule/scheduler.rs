//! Pure half of the time-slot scheduler.
//!
//! Overlap is the half-open interval test: `[s1, e1)` and `[s2, e2)` overlap
//! iff `s2 < e1 && e2 > s1`. Back-to-back slots (one ends when the next
//! starts) do not overlap.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::TimeSlot;
use crate::domain::foundation::{CafeScoped, ServiceError, SlotId};

/// A validated `(date, start, end)` triple with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
}

impl SlotWindow {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, ServiceError> {
        if start >= end {
            return Err(ServiceError::validation(
                "end_time",
                "slot must end after it starts",
            ));
        }
        Ok(Self { date, start, end })
    }

    pub(crate) fn from_parts_unchecked(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self { date, start, end }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    /// Strictly before `now`.
    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        self.starts_at() < now
    }

    pub fn overlaps(&self, other: &SlotWindow) -> bool {
        self.date == other.date && other.start < self.end && other.end > self.start
    }
}

/// First active slot in `others` that overlaps `window`, ignoring `exclude`.
///
/// `others` are expected to be slots of the same cafe.
pub fn find_overlap<'a>(
    window: &SlotWindow,
    others: &'a [TimeSlot],
    exclude: Option<SlotId>,
) -> Option<&'a TimeSlot> {
    others
        .iter()
        .filter(|slot| Some(slot.id) != exclude && slot.is_active())
        .find(|slot| slot.window().overlaps(window))
}

/// A new slot may not start in the past.
pub fn check_creation_time(window: &SlotWindow, now: NaiveDateTime) -> Result<(), ServiceError> {
    if window.is_past(now) {
        return Err(ServiceError::validation("date", "cannot schedule in the past"));
    }
    Ok(())
}

/// Timing rules for moving an existing slot.
///
/// An unchanged window is always fine, so metadata edits on a past slot go
/// through. A slot that has already started cannot be moved, and a future
/// slot cannot be moved into the past.
pub fn check_reschedule_time(
    current: &SlotWindow,
    proposed: &SlotWindow,
    now: NaiveDateTime,
) -> Result<(), ServiceError> {
    if current == proposed {
        return Ok(());
    }
    if current.is_past(now) {
        return Err(ServiceError::validation(
            "date",
            "cannot reschedule a slot that has already started",
        ));
    }
    check_creation_time(proposed, now)
}
