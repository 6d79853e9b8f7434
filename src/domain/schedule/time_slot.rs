//! TimeSlot entity - a pre-defined reservable interval.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::SlotWindow;
use crate::domain::foundation::{CafeId, CafeScoped, Patch, SlotId, Timestamp};

/// A discrete reservable interval of one cafe on one date.
///
/// # Invariants
///
/// - `start_time < end_time`
/// - two active slots of one cafe on one date never overlap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub cafe_id: CafeId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TimeSlot {
    pub fn from_new(id: SlotId, new: NewTimeSlot) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            cafe_id: new.cafe_id,
            date: new.date,
            start_time: new.start_time,
            end_time: new.end_time,
            description: new.description,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The slot's time window. Construction already guaranteed ordering.
    pub fn window(&self) -> SlotWindow {
        SlotWindow::from_parts_unchecked(self.date, self.start_time, self.end_time)
    }

    /// The window this slot would have after `patch`.
    pub fn patched_window(&self, patch: &TimeSlotPatch) -> (NaiveDate, NaiveTime, NaiveTime) {
        (
            patch.date.resolve_ref(&self.date),
            patch.start_time.resolve_ref(&self.start_time),
            patch.end_time.resolve_ref(&self.end_time),
        )
    }

    pub fn apply(&mut self, patch: TimeSlotPatch) {
        self.date = patch.date.resolve(self.date);
        self.start_time = patch.start_time.resolve(self.start_time);
        self.end_time = patch.end_time.resolve(self.end_time);
        self.description = patch.description.resolve(self.description.take());
        self.active = patch.active.resolve(self.active);
        self.updated_at = Timestamp::now();
    }
}

impl CafeScoped for TimeSlot {
    fn cafe_id(&self) -> CafeId {
        self.cafe_id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeSlot {
    pub cafe_id: CafeId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimeSlotPatch {
    #[serde(default)]
    pub date: Patch<NaiveDate>,
    #[serde(default)]
    pub start_time: Patch<NaiveTime>,
    #[serde(default)]
    pub end_time: Patch<NaiveTime>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub active: Patch<bool>,
}

impl TimeSlotPatch {
    /// True when the patch touches date or times.
    pub fn moves_window(&self) -> bool {
        self.date.is_set() || self.start_time.is_set() || self.end_time.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot() -> TimeSlot {
        TimeSlot::from_new(
            SlotId::new(1),
            NewTimeSlot {
                cafe_id: CafeId::new(1),
                date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
                description: None,
            },
        )
    }

    #[test]
    fn patched_window_keeps_unset_parts() {
        let patch = TimeSlotPatch {
            end_time: Patch::Set(NaiveTime::from_hms_opt(20, 0, 0).unwrap()),
            ..TimeSlotPatch::default()
        };
        let (date, start, end) = slot().patched_window(&patch);

        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(start, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
    }

    #[test]
    fn description_only_patch_does_not_move_window() {
        let patch = TimeSlotPatch {
            description: Patch::Set(Some("terrace".to_string())),
            ..TimeSlotPatch::default()
        };
        assert!(!patch.moves_window());
    }

    #[test]
    fn deserializes_times_from_json() {
        let patch: TimeSlotPatch =
            serde_json::from_str(r#"{"start_time": "17:30:00", "active": false}"#).unwrap();
        assert_eq!(
            patch.start_time,
            Patch::Set(NaiveTime::from_hms_opt(17, 30, 0).unwrap())
        );
        assert_eq!(patch.active, Patch::Set(false));
    }
}
