//! Catalog - cafes and the resources a cafe owns.
//!
//! Tables, dishes and promotions all belong to exactly one cafe and are
//! administered by that cafe's managers.

mod action;
mod cafe;
mod dish;
mod table;

pub use action::{Action, ActionPatch, NewAction, MAX_ACTION_DESCRIPTION_LENGTH};
pub use cafe::{Cafe, CafePatch, NewCafe, MAX_ADDRESS_LENGTH, MAX_CAFE_NAME_LENGTH, MAX_PHONE_LENGTH};
pub use dish::{Dish, DishPatch, NewDish, MAX_DISH_NAME_LENGTH};
pub use table::{NewTable, Table, TablePatch};

use crate::domain::foundation::ValidationError;

/// Non-blank text of at most `max` characters.
pub(crate) fn require_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::out_of_range(field, 1, max as i64, len as i64));
    }
    Ok(())
}
