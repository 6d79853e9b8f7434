//! CreateCafeHandler - Command handler for opening cafes.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::retry::{with_retry, RetryPolicy};
use crate::domain::catalog::{Cafe, NewCafe};
use crate::domain::foundation::{
    require_superuser, CafeId, CommandMetadata, ServiceError, UserId,
};
use crate::ports::{TransactionManager, UnitOfWork};

/// Command to create a cafe. Superusers only.
#[derive(Debug, Clone)]
pub struct CreateCafeCommand {
    pub cafe: NewCafe,
}

pub struct CreateCafeHandler {
    transactions: Arc<dyn TransactionManager>,
    retry: RetryPolicy,
}

impl CreateCafeHandler {
    pub fn new(transactions: Arc<dyn TransactionManager>) -> Self {
        Self {
            transactions,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[tracing::instrument(skip(self, cmd, metadata), fields(name = %cmd.cafe.name))]
    pub async fn handle(
        &self,
        cmd: CreateCafeCommand,
        metadata: CommandMetadata,
    ) -> Result<Cafe, ServiceError> {
        require_superuser(&metadata.actor)?;
        cmd.cafe.validate()?;

        let cafe = with_retry(&self.retry, "create_cafe", || self.attempt(&cmd)).await?;
        tracing::info!(cafe_id = %cafe.id, "cafe created");
        Ok(cafe)
    }

    async fn attempt(&self, cmd: &CreateCafeCommand) -> Result<Cafe, ServiceError> {
        let mut uow = self.transactions.begin().await?;
        ensure_unique_name(uow.as_mut(), &cmd.cafe.name, None).await?;
        ensure_users_exist(uow.as_mut(), &cmd.cafe.manager_ids).await?;
        let cafe = uow.insert_cafe(cmd.cafe.clone()).await?;
        uow.commit().await?;
        Ok(cafe)
    }
}

/// Cafe names are unique across the chain.
pub(super) async fn ensure_unique_name(
    uow: &mut dyn UnitOfWork,
    name: &str,
    exclude: Option<CafeId>,
) -> Result<(), ServiceError> {
    match uow.find_cafe_by_name(name).await? {
        Some(existing) if Some(existing.id) != exclude => Err(ServiceError::validation(
            "name",
            format!("cafe named '{}' already exists", name),
        )),
        _ => Ok(()),
    }
}

/// Every manager id names an existing user.
pub(super) async fn ensure_users_exist(
    uow: &mut dyn UnitOfWork,
    ids: &BTreeSet<UserId>,
) -> Result<(), ServiceError> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: BTreeSet<UserId> = uow
        .get_users_by_ids(ids)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();
    let missing: Vec<UserId> = ids.difference(&found).copied().collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::not_found_ids("User", missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{set, World};

    fn draft(name: &str, managers: BTreeSet<UserId>) -> CreateCafeCommand {
        CreateCafeCommand {
            cafe: NewCafe {
                name: name.to_string(),
                address: "5 Harbour Rd".to_string(),
                phone: "+200".to_string(),
                description: Some("by the sea".to_string()),
                manager_ids: managers,
            },
        }
    }

    #[tokio::test]
    async fn superuser_creates_cafe_with_managers() {
        let world = World::new().await;
        let handler = CreateCafeHandler::new(world.store.clone());

        let cafe = handler
            .handle(draft("Harbour", set(&[world.manager])), world.as_admin())
            .await
            .unwrap();
        assert!(cafe.active);
        assert!(cafe.is_managed_by(world.manager));

        let manager = world.store.user(world.manager).await.unwrap();
        assert!(manager.managed_cafe_ids.contains(&cafe.id));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let world = World::new().await;
        let handler = CreateCafeHandler::new(world.store.clone());

        let result = handler
            .handle(draft("Central", BTreeSet::new()), world.as_admin())
            .await;
        assert!(matches!(result, Err(ServiceError::Validation { ref field, .. }) if field == "name"));
    }

    #[tokio::test]
    async fn unknown_manager_is_not_found() {
        let world = World::new().await;
        let handler = CreateCafeHandler::new(world.store.clone());

        let result = handler
            .handle(draft("Harbour", set(&[UserId::new(777)])), world.as_admin())
            .await;
        assert_eq!(result, Err(ServiceError::not_found_ids("User", [777i64])));
    }

    #[tokio::test]
    async fn manager_cannot_create_cafe() {
        let world = World::new().await;
        let handler = CreateCafeHandler::new(world.store.clone());

        let result = handler
            .handle(draft("Harbour", BTreeSet::new()), world.as_manager())
            .await;
        assert_eq!(result, Err(ServiceError::PermissionDenied));
    }

    #[tokio::test]
    async fn blank_phone_is_rejected() {
        let world = World::new().await;
        let handler = CreateCafeHandler::new(world.store.clone());
        let mut cmd = draft("Harbour", BTreeSet::new());
        cmd.cafe.phone = " ".to_string();

        let result = handler.handle(cmd, world.as_admin()).await;
        assert!(matches!(result, Err(ServiceError::Validation { ref field, .. }) if field == "phone"));
    }
}
