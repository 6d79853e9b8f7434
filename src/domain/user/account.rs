//! User account.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Actor, CafeId, UserId};

/// A registered user.
///
/// Credentials live with the authentication service; this is only what
/// authorization needs. `managed_cafe_ids` is derived from the cafe manager
/// association when the user is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub phone: String,
    pub email: Option<String>,
    pub is_superuser: bool,
    pub active: bool,
    pub managed_cafe_ids: BTreeSet<CafeId>,
}

impl User {
    /// The per-request actor for this user.
    ///
    /// A deactivated account acts as an anonymous caller.
    pub fn actor(&self) -> Actor {
        if !self.active {
            return Actor::anonymous();
        }
        Actor {
            user_id: Some(self.id),
            is_superuser: self.is_superuser,
            managed_cafe_ids: self.managed_cafe_ids.clone(),
        }
    }

    pub fn is_manager(&self) -> bool {
        !self.managed_cafe_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(active: bool) -> User {
        User {
            id: UserId::new(4),
            username: "olga".to_string(),
            phone: "+79990000000".to_string(),
            email: None,
            is_superuser: false,
            active,
            managed_cafe_ids: [CafeId::new(2)].into_iter().collect(),
        }
    }

    #[test]
    fn actor_carries_managed_cafes() {
        let actor = user(true).actor();
        assert_eq!(actor.user_id, Some(UserId::new(4)));
        assert!(actor.manages(CafeId::new(2)));
        assert!(!actor.is_superuser);
    }

    #[test]
    fn inactive_user_acts_anonymously() {
        let actor = user(false).actor();
        assert!(actor.is_anonymous());
        assert!(!actor.manages_any());
    }

    #[test]
    fn manager_flag_follows_association() {
        assert!(user(true).is_manager());
    }
}
