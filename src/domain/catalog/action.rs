//! Action entity - a promotion advertised by a cafe.

use serde::{Deserialize, Serialize};

use super::require_text;
use crate::domain::foundation::{ActionId, CafeId, CafeScoped, Patch, Timestamp, ValidationError};

pub const MAX_ACTION_DESCRIPTION_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub cafe_id: CafeId,
    pub description: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Action {
    pub fn from_new(id: ActionId, new: NewAction) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            cafe_id: new.cafe_id,
            description: new.description,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ActionPatch) {
        self.cafe_id = patch.cafe_id.resolve(self.cafe_id);
        self.description = patch.description.resolve(std::mem::take(&mut self.description));
        self.active = patch.active.resolve(self.active);
        self.updated_at = Timestamp::now();
    }
}

impl CafeScoped for Action {
    fn cafe_id(&self) -> CafeId {
        self.cafe_id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAction {
    pub cafe_id: CafeId,
    pub description: String,
}

impl NewAction {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description, MAX_ACTION_DESCRIPTION_LENGTH)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionPatch {
    #[serde(default)]
    pub cafe_id: Patch<CafeId>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub active: Patch<bool>,
}

impl ActionPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.description.as_set() {
            Some(description) => {
                require_text("description", description, MAX_ACTION_DESCRIPTION_LENGTH)
            }
            None => Ok(()),
        }
    }
}
