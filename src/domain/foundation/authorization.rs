//! Authorization evaluator.
//!
//! Every function here is pure: it reads the per-request [`Actor`] and the
//! already-loaded scope of a resource, and decides. Nothing loads from
//! storage and nothing is cached on the actor between requests.
//!
//! Two separate questions are answered:
//! - *visibility*: may the actor see inactive rows? (`can_view_inactive`,
//!   `can_view_inactive_booking`, [`visibility_policy`])
//! - *mutability*: may the actor change the resource? (`require_manager_or_admin`,
//!   `can_edit_booking`)
//!
//! A resource the actor cannot see is reported as not found, never as
//! forbidden, so its existence does not leak.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{CafeId, CafeScoped, OwnedByUser, ServiceError, UserId};

/// The authenticated principal of one request.
///
/// Built once per request (see `User::actor`) and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Option<UserId>,
    pub is_superuser: bool,
    pub managed_cafe_ids: BTreeSet<CafeId>,
}

impl Actor {
    /// An unauthenticated caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A regular customer with no administrative scope.
    pub fn customer(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn manager(user_id: UserId, cafes: impl IntoIterator<Item = CafeId>) -> Self {
        Self {
            user_id: Some(user_id),
            is_superuser: false,
            managed_cafe_ids: cafes.into_iter().collect(),
        }
    }

    pub fn superuser(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            is_superuser: true,
            managed_cafe_ids: BTreeSet::new(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn manages(&self, cafe_id: CafeId) -> bool {
        self.managed_cafe_ids.contains(&cafe_id)
    }

    pub fn manages_any(&self) -> bool {
        !self.managed_cafe_ids.is_empty()
    }

    /// True when the actor is the owner of `resource`.
    pub fn owns<T: OwnedByUser + ?Sized>(&self, resource: &T) -> bool {
        self.user_id
            .as_ref()
            .map(|id| resource.is_owner(id))
            .unwrap_or(false)
    }

    /// Returns the user id, or `PermissionDenied` for anonymous callers.
    pub fn require_user(&self) -> Result<UserId, ServiceError> {
        self.user_id.ok_or(ServiceError::PermissionDenied)
    }

    fn label(&self) -> String {
        self.user_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Which lifecycle states of a resource an actor may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadScope {
    ActiveOnly,
    All,
}

impl ReadScope {
    pub fn includes_inactive(&self) -> bool {
        matches!(self, ReadScope::All)
    }

    /// Whether a row with the given effective active flag is readable.
    pub fn admits(&self, active: bool) -> bool {
        active || self.includes_inactive()
    }
}

/// Where a resource sits relative to cafes and users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceScope {
    /// Owning cafe, or `None` for a cross-cafe listing.
    pub cafe_id: Option<CafeId>,
    /// Owning user for user-owned resources (bookings).
    pub owner_id: Option<UserId>,
}

impl ResourceScope {
    pub fn cafe(cafe_id: CafeId) -> Self {
        Self {
            cafe_id: Some(cafe_id),
            owner_id: None,
        }
    }

    pub fn owned(cafe_id: CafeId, owner_id: UserId) -> Self {
        Self {
            cafe_id: Some(cafe_id),
            owner_id: Some(owner_id),
        }
    }
}

/// Result of an authorization check.
///
/// Contains both the decision and context for logging.
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    pub granted: bool,
    pub resource_type: &'static str,
    pub resource_id: String,
    pub user_id: String,
    pub denial_reason: Option<String>,
}

impl AuthorizationResult {
    pub fn granted(
        resource_type: &'static str,
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            granted: true,
            resource_type,
            resource_id: resource_id.into(),
            user_id: user_id.into(),
            denial_reason: None,
        }
    }

    pub fn denied(
        resource_type: &'static str,
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            granted: false,
            resource_type,
            resource_id: resource_id.into(),
            user_id: user_id.into(),
            denial_reason: Some(reason.into()),
        }
    }

    /// Logs denials and converts to `PermissionDenied`.
    pub fn into_result(self) -> Result<(), ServiceError> {
        if self.granted {
            return Ok(());
        }
        tracing::warn!(
            resource_type = self.resource_type,
            resource_id = %self.resource_id,
            user_id = %self.user_id,
            reason = self.denial_reason.as_deref().unwrap_or("access denied"),
            "Authorization denied"
        );
        Err(ServiceError::PermissionDenied)
    }

    pub fn is_granted(&self) -> bool {
        self.granted
    }
}

/// True iff the actor is a superuser or manages `cafe_id`.
///
/// With no cafe (a global listing) any managed cafe is enough.
pub fn can_view_inactive(actor: &Actor, cafe_id: Option<CafeId>) -> bool {
    if actor.is_superuser {
        return true;
    }
    match cafe_id {
        Some(cafe_id) => actor.manages(cafe_id),
        None => actor.manages_any(),
    }
}

/// Same predicate as [`can_view_inactive`], as an authorization result.
pub fn check_manager_or_admin(actor: &Actor, cafe_id: CafeId) -> AuthorizationResult {
    if can_view_inactive(actor, Some(cafe_id)) {
        AuthorizationResult::granted("Cafe", cafe_id.to_string(), actor.label())
    } else {
        AuthorizationResult::denied(
            "Cafe",
            cafe_id.to_string(),
            actor.label(),
            "actor neither manages the cafe nor is a superuser",
        )
    }
}

/// Gate for mutating cafe-scoped resources.
pub fn require_manager_or_admin(actor: &Actor, cafe_id: CafeId) -> Result<(), ServiceError> {
    check_manager_or_admin(actor, cafe_id).into_result()
}

/// Gate for operations reserved to superusers.
pub fn require_superuser(actor: &Actor) -> Result<(), ServiceError> {
    if actor.is_superuser {
        Ok(())
    } else {
        AuthorizationResult::denied("System", "-", actor.label(), "superuser required").into_result()
    }
}

/// Owners, managers of the booking's cafe and superusers see inactive bookings.
pub fn can_view_inactive_booking<B>(actor: &Actor, booking: &B) -> bool
where
    B: CafeScoped + OwnedByUser,
{
    can_view_inactive(actor, Some(booking.cafe_id())) || actor.owns(booking)
}

/// Resources whose owner loses edit rights once they are closed.
pub trait Closable {
    fn is_closed(&self) -> bool;
}

/// Managers and superusers may always edit, including cancelled or
/// deactivated bookings. The owner may edit only while the booking is
/// active and not closed.
pub fn can_edit_booking<B>(actor: &Actor, booking: &B) -> bool
where
    B: CafeScoped + OwnedByUser + Closable,
{
    if can_view_inactive(actor, Some(booking.cafe_id())) {
        return true;
    }
    actor.owns(booking) && booking.is_active() && !booking.is_closed()
}

/// The single visibility policy shared by every entity type.
pub fn visibility_policy(actor: &Actor, scope: &ResourceScope) -> ReadScope {
    let owner = matches!(
        (actor.user_id, scope.owner_id),
        (Some(actor_id), Some(owner_id)) if actor_id == owner_id
    );
    if owner || can_view_inactive(actor, scope.cafe_id) {
        ReadScope::All
    } else {
        ReadScope::ActiveOnly
    }
}

/// Whether a row with effective flag `active` is visible to the actor.
pub fn is_visible(actor: &Actor, scope: &ResourceScope, active: bool) -> bool {
    visibility_policy(actor, scope).admits(active)
}

/// Reports an invisible resource as not found.
pub fn ensure_visible(
    actor: &Actor,
    scope: &ResourceScope,
    active: bool,
    resource: &'static str,
    id: impl Into<i64>,
) -> Result<(), ServiceError> {
    if is_visible(actor, scope, active) {
        Ok(())
    } else {
        Err(ServiceError::not_found_ids(resource, [id.into()]))
    }
}
