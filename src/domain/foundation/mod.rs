//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, error types, the authorization evaluator and the
//! small traits that form the vocabulary of the reservation domain.

mod authorization;
mod command;
mod errors;
mod ids;
mod ownership;
mod patch;
mod service_error;
mod state_machine;
mod timestamp;

pub use authorization::{
    can_edit_booking, can_view_inactive, can_view_inactive_booking, check_manager_or_admin,
    ensure_visible, is_visible, require_manager_or_admin, require_superuser, visibility_policy,
    Actor, AuthorizationResult, Closable, ReadScope, ResourceScope,
};
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{join_ids, ActionId, BookingId, CafeId, DishId, SlotId, TableId, UserId};
pub use ownership::{CafeScoped, OwnedByUser};
pub use patch::Patch;
pub use service_error::ServiceError;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
