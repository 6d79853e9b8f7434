//! Clock port.
//!
//! Slot dates and times are cafe-local wall-clock values, so the clock
//! answers in naive local time.

use chrono::{NaiveDate, NaiveDateTime};

pub trait Clock: Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
