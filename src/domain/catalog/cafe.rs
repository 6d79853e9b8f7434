//! Cafe entity - the top-level scoping entity.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::require_text;
use crate::domain::foundation::{CafeId, CafeScoped, Patch, Timestamp, UserId, ValidationError};

pub const MAX_CAFE_NAME_LENGTH: usize = 128;
pub const MAX_ADDRESS_LENGTH: usize = 255;
pub const MAX_PHONE_LENGTH: usize = 32;

/// A physical restaurant location.
///
/// # Invariants
///
/// - `name` is unique across the chain (enforced by the store)
/// - `name`, `address` and `phone` are non-empty
/// - `active = false` hides the cafe and every child from ordinary actors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cafe {
    pub id: CafeId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub description: Option<String>,
    pub active: bool,
    pub manager_ids: BTreeSet<UserId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cafe {
    /// Materializes a validated draft under a store-assigned id.
    pub fn from_new(id: CafeId, new: NewCafe) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            name: new.name,
            address: new.address,
            phone: new.phone,
            description: new.description,
            active: true,
            manager_ids: new.manager_ids,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_managed_by(&self, user_id: UserId) -> bool {
        self.manager_ids.contains(&user_id)
    }

    /// Applies a validated patch in place.
    pub fn apply(&mut self, patch: CafePatch) {
        let CafePatch {
            name,
            address,
            phone,
            description,
            manager_ids,
            active,
        } = patch;
        self.name = name.resolve(std::mem::take(&mut self.name));
        self.address = address.resolve(std::mem::take(&mut self.address));
        self.phone = phone.resolve(std::mem::take(&mut self.phone));
        self.description = description.resolve(self.description.take());
        self.manager_ids = manager_ids.resolve(std::mem::take(&mut self.manager_ids));
        self.active = active.resolve(self.active);
        self.updated_at = Timestamp::now();
    }
}

impl CafeScoped for Cafe {
    fn cafe_id(&self) -> CafeId {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Draft of a cafe not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCafe {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub description: Option<String>,
    #[serde(default)]
    pub manager_ids: BTreeSet<UserId>,
}

impl NewCafe {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, MAX_CAFE_NAME_LENGTH)?;
        require_text("address", &self.address, MAX_ADDRESS_LENGTH)?;
        require_text("phone", &self.phone, MAX_PHONE_LENGTH)?;
        Ok(())
    }
}

/// Partial update of a cafe. `manager_ids` replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CafePatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub address: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default, rename = "managers")]
    pub manager_ids: Patch<BTreeSet<UserId>>,
    #[serde(default)]
    pub active: Patch<bool>,
}

impl CafePatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self.name.as_set() {
            require_text("name", name, MAX_CAFE_NAME_LENGTH)?;
        }
        if let Some(address) = self.address.as_set() {
            require_text("address", address, MAX_ADDRESS_LENGTH)?;
        }
        if let Some(phone) = self.phone.as_set() {
            require_text("phone", phone, MAX_PHONE_LENGTH)?;
        }
        Ok(())
    }
}
