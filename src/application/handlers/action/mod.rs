//! Promotion command and query handlers.

mod create_action;
mod get_action;
mod update_action;

pub use create_action::{CreateActionCommand, CreateActionHandler};
pub use get_action::{GetActionHandler, GetActionQuery, ListActionsHandler, ListActionsQuery};
pub use update_action::{UpdateActionCommand, UpdateActionHandler};
