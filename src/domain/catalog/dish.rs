//! Dish entity - one item on a cafe's menu.

use serde::{Deserialize, Serialize};

use super::require_text;
use crate::domain::foundation::{CafeId, CafeScoped, DishId, Patch, Timestamp, ValidationError};

pub const MAX_DISH_NAME_LENGTH: usize = 64;

/// A dish that can be pre-ordered with a booking.
///
/// # Invariants
///
/// - `name` is 1-64 characters and unique within its cafe
/// - `price` is non-negative, in minor currency units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub cafe_id: CafeId,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Dish {
    pub fn from_new(id: DishId, new: NewDish) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            cafe_id: new.cafe_id,
            name: new.name,
            price: new.price,
            description: new.description,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: DishPatch) {
        self.cafe_id = patch.cafe_id.resolve(self.cafe_id);
        self.name = patch.name.resolve(std::mem::take(&mut self.name));
        self.price = patch.price.resolve(self.price);
        self.description = patch.description.resolve(self.description.take());
        self.active = patch.active.resolve(self.active);
        self.updated_at = Timestamp::now();
    }
}

impl CafeScoped for Dish {
    fn cafe_id(&self) -> CafeId {
        self.cafe_id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

fn validate_price(price: i64) -> Result<(), ValidationError> {
    if price < 0 {
        Err(ValidationError::out_of_range("price", 0, i64::MAX, price))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDish {
    pub cafe_id: CafeId,
    pub name: String,
    pub price: i64,
    pub description: Option<String>,
}

impl NewDish {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name, MAX_DISH_NAME_LENGTH)?;
        validate_price(self.price)
    }
}

/// Partial update of a dish. Setting `cafe_id` moves it to another menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DishPatch {
    #[serde(default)]
    pub cafe_id: Patch<CafeId>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub price: Patch<i64>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub active: Patch<bool>,
}

impl DishPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self.name.as_set() {
            require_text("name", name, MAX_DISH_NAME_LENGTH)?;
        }
        if let Some(price) = self.price.as_set() {
            validate_price(*price)?;
        }
        Ok(())
    }
}
