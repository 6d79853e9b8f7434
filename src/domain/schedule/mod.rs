//! Schedule - reservable time slots and the rules that keep them disjoint.

mod scheduler;
mod time_slot;

pub use scheduler::{check_creation_time, check_reschedule_time, find_overlap, SlotWindow};
pub use time_slot::{NewTimeSlot, TimeSlot, TimeSlotPatch};
