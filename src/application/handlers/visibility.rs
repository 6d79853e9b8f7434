//! Visibility helpers shared by the catalog handlers.
//!
//! Children of a cafe (tables, slots, dishes, promotions) inherit the
//! cafe's `active` flag: to an ordinary actor a child is visible only when
//! both the child and its cafe are active.

use std::collections::BTreeMap;

use crate::domain::catalog::Cafe;
use crate::domain::foundation::{
    can_view_inactive, ensure_visible, is_visible, Actor, CafeId, ReadScope, ResourceScope,
    ServiceError,
};

/// Checks that `cafe` exists and is visible to `actor`.
pub(crate) fn visible_cafe(
    actor: &Actor,
    cafe_id: CafeId,
    cafe: Option<Cafe>,
) -> Result<Cafe, ServiceError> {
    let cafe = cafe.ok_or_else(|| ServiceError::not_found_ids("Cafe", [cafe_id]))?;
    ensure_visible(actor, &ResourceScope::cafe(cafe.id), cafe.active, "Cafe", cafe.id)?;
    Ok(cafe)
}

/// Checks that a child row of `cafe` is visible to `actor`.
pub(crate) fn ensure_child_visible(
    actor: &Actor,
    cafe: &Cafe,
    active: bool,
    resource: &'static str,
    id: impl Into<i64>,
) -> Result<(), ServiceError> {
    ensure_visible(
        actor,
        &ResourceScope::cafe(cafe.id),
        active && cafe.active,
        resource,
        id,
    )
}

/// Read scope for listing children of a single cafe.
///
/// Inactive rows come back only when asked for and the actor may see them.
pub(crate) fn listing_scope(actor: &Actor, cafe_id: CafeId, show_all: bool) -> ReadScope {
    if show_all && can_view_inactive(actor, Some(cafe_id)) {
        ReadScope::All
    } else {
        ReadScope::ActiveOnly
    }
}

/// Filter for listings that span cafes.
///
/// `cafes` maps every known cafe id to its `active` flag.
pub(crate) struct CrossCafeFilter<'a> {
    actor: &'a Actor,
    cafes: BTreeMap<CafeId, bool>,
    show_all: bool,
}

impl<'a> CrossCafeFilter<'a> {
    pub(crate) fn new(actor: &'a Actor, cafes: &[Cafe], show_all: bool) -> Self {
        Self {
            actor,
            cafes: cafes.iter().map(|c| (c.id, c.active)).collect(),
            show_all,
        }
    }

    pub(crate) fn admits(&self, cafe_id: CafeId, active: bool) -> bool {
        let cafe_active = self.cafes.get(&cafe_id).copied().unwrap_or(false);
        let effective = active && cafe_active;
        if effective {
            return true;
        }
        self.show_all && is_visible(self.actor, &ResourceScope::cafe(cafe_id), effective)
    }
}
