//! Table entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CafeId, CafeScoped, Patch, TableId, Timestamp, ValidationError};

/// Upper bound on seats at one table; guards against typos, not physics.
pub const MAX_TABLE_SEATS: i32 = 100;

/// A table belonging exclusively to one cafe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub cafe_id: CafeId,
    pub seats: i32,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Table {
    pub fn from_new(id: TableId, new: NewTable) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            cafe_id: new.cafe_id,
            seats: new.seats,
            description: new.description,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: TablePatch) {
        self.seats = patch.seats.resolve(self.seats);
        self.description = patch.description.resolve(self.description.take());
        self.active = patch.active.resolve(self.active);
        self.updated_at = Timestamp::now();
    }
}

impl CafeScoped for Table {
    fn cafe_id(&self) -> CafeId {
        self.cafe_id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

fn validate_seats(seats: i32) -> Result<(), ValidationError> {
    if (1..=MAX_TABLE_SEATS).contains(&seats) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(
            "seats",
            1,
            MAX_TABLE_SEATS as i64,
            seats as i64,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTable {
    pub cafe_id: CafeId,
    pub seats: i32,
    pub description: Option<String>,
}

impl NewTable {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_seats(self.seats)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TablePatch {
    #[serde(default)]
    pub seats: Patch<i32>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub active: Patch<bool>,
}

impl TablePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.seats.as_set() {
            Some(seats) => validate_seats(*seats),
            None => Ok(()),
        }
    }
}
