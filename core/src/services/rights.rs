//! Rights authority: answers "may this user do that on this business?"
//!
//! A missing rights row means every capability is false. Managing rows
//! requires `ownerRights` on the business; administrators get no bypass.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::rights::{BusinessUserRights, Capability, RightsPatch};
use crate::errors::{AuthError, DomainError};
use crate::repositories::{BusinessRepository, RightsRepository, UserRepository};

pub struct RightsService<B, R, U>
where
    B: BusinessRepository,
    R: RightsRepository,
    U: UserRepository,
{
    businesses: Arc<B>,
    rights: Arc<R>,
    users: Arc<U>,
}

impl<B, R, U> RightsService<B, R, U>
where
    B: BusinessRepository,
    R: RightsRepository,
    U: UserRepository,
{
    pub fn new(businesses: Arc<B>, rights: Arc<R>, users: Arc<U>) -> Self {
        Self {
            businesses,
            rights,
            users,
        }
    }

    /// The rights of `user_id` on `business_id`; all false when no row exists
    pub async fn lookup(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<BusinessUserRights, DomainError> {
        Ok(self
            .rights
            .find(business_id, user_id)
            .await?
            .unwrap_or_else(|| BusinessUserRights::none(business_id, user_id)))
    }

    /// Fail with `InsufficientPermissions` unless the user holds `capability`
    pub async fn require(
        &self,
        business_id: Uuid,
        user_id: Uuid,
        capability: Capability,
    ) -> Result<BusinessUserRights, DomainError> {
        let rights = self.lookup(business_id, user_id).await?;
        if !rights.has(capability) {
            debug!(%business_id, %user_id, %capability, "Capability missing");
            return Err(AuthError::InsufficientPermissions.into());
        }
        Ok(rights)
    }

    /// Fail with `InsufficientPermissions` unless the user has any rights row
    pub async fn require_member(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<BusinessUserRights, DomainError> {
        self.rights
            .find(business_id, user_id)
            .await?
            .ok_or_else(|| {
                debug!(%business_id, %user_id, "No rights row for user");
                DomainError::from(AuthError::InsufficientPermissions)
            })
    }

    async fn ensure_business(&self, business_id: Uuid) -> Result<(), DomainError> {
        match self.businesses.find_aggregate(business_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Business")),
        }
    }

    /// Every rights row of a business; the caller must be a member
    pub async fn list(
        &self,
        business_id: Uuid,
        caller: Uuid,
    ) -> Result<Vec<BusinessUserRights>, DomainError> {
        self.ensure_business(business_id).await?;
        self.require_member(business_id, caller).await?;
        self.rights.list_for_business(business_id).await
    }

    /// The rights of `target` as seen by `caller`: own row, or any row for an owner
    pub async fn view(
        &self,
        business_id: Uuid,
        caller: Uuid,
        target: Uuid,
    ) -> Result<BusinessUserRights, DomainError> {
        if caller != target {
            self.require(business_id, caller, Capability::Owner).await?;
        }
        self.lookup(business_id, target).await
    }

    /// Create a rights row for `target`; unspecified flags are false
    pub async fn grant(
        &self,
        business_id: Uuid,
        caller: Uuid,
        target: Uuid,
        flags: RightsPatch,
    ) -> Result<BusinessUserRights, DomainError> {
        self.ensure_business(business_id).await?;
        self.require(business_id, caller, Capability::Owner).await?;
        if self.users.find_by_id(target).await?.is_none() {
            return Err(AuthError::UserNotFound.into());
        }

        let rights = self
            .rights
            .create(BusinessUserRights::new(business_id, target, flags.into_flags()))
            .await?;
        info!(%business_id, granted_to = %target, granted_by = %caller, "Rights granted");
        Ok(rights)
    }

    /// Apply a partial flag update to the row of `target`
    pub async fn update(
        &self,
        business_id: Uuid,
        caller: Uuid,
        target: Uuid,
        patch: RightsPatch,
    ) -> Result<BusinessUserRights, DomainError> {
        self.ensure_business(business_id).await?;
        self.require(business_id, caller, Capability::Owner).await?;

        let mut rights = self
            .rights
            .find(business_id, target)
            .await?
            .ok_or_else(|| DomainError::not_found("Rights"))?;
        rights.apply(&patch);

        let rights = self.rights.update(rights).await?;
        info!(%business_id, user_id = %target, updated_by = %caller, "Rights updated");
        Ok(rights)
    }

    /// Delete the row of `target`
    pub async fn revoke(
        &self,
        business_id: Uuid,
        caller: Uuid,
        target: Uuid,
    ) -> Result<(), DomainError> {
        self.ensure_business(business_id).await?;
        self.require(business_id, caller, Capability::Owner).await?;

        if !self.rights.delete(business_id, target).await? {
            return Err(DomainError::not_found("Rights"));
        }
        info!(%business_id, user_id = %target, revoked_by = %caller, "Rights revoked");
        Ok(())
    }
}
