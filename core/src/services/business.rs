//! Business aggregate use cases
//!
//! Creation and deletion are all-or-nothing across address, contact, business
//! and rights rows; the repository runs each in one transaction.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::business::{BusinessAggregate, BusinessPatch, NewBusiness};
use crate::domain::entities::rights::{BusinessUserRights, Capability};
use crate::errors::{DomainError, ValidationError};
use crate::repositories::{BusinessRepository, RightsRepository, UserRepository};
use crate::services::rights::RightsService;

pub struct BusinessService<B, R, U>
where
    B: BusinessRepository,
    R: RightsRepository,
    U: UserRepository,
{
    businesses: Arc<B>,
    authority: Arc<RightsService<B, R, U>>,
}

impl<B, R, U> BusinessService<B, R, U>
where
    B: BusinessRepository,
    R: RightsRepository,
    U: UserRepository,
{
    pub fn new(businesses: Arc<B>, authority: Arc<RightsService<B, R, U>>) -> Self {
        Self {
            businesses,
            authority,
        }
    }

    async fn find(&self, business_id: Uuid) -> Result<BusinessAggregate, DomainError> {
        self.businesses
            .find_aggregate(business_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Business"))
    }

    async fn ensure_unique(
        &self,
        aggregate: &BusinessAggregate,
        exclude: Option<Uuid>,
    ) -> Result<(), DomainError> {
        if let Some(field) = self
            .businesses
            .find_conflict(&aggregate.unique_keys(), exclude)
            .await?
        {
            info!(%field, "Business write rejected on duplicate value");
            return Err(ValidationError::DuplicateValue { field }.into());
        }
        Ok(())
    }

    /// Create a business owned by `creator`, who receives every right
    pub async fn create(
        &self,
        creator: Uuid,
        input: NewBusiness,
    ) -> Result<BusinessAggregate, DomainError> {
        input.validate()?;
        let aggregate = input.into_aggregate();
        self.ensure_unique(&aggregate, None).await?;

        let owner = BusinessUserRights::owner(aggregate.business.id, creator);
        self.businesses
            .create_aggregate(&aggregate, &owner)
            .await
            .map_err(|e| {
                if e.is_internal() {
                    warn!(error = %e, "Business creation rolled back");
                }
                e
            })?;

        info!(business_id = %aggregate.business.id, owner = %creator, "Business created");
        Ok(aggregate)
    }

    /// Businesses the caller holds a rights row on
    pub async fn list(&self, caller: Uuid) -> Result<Vec<BusinessAggregate>, DomainError> {
        self.businesses.list_for_user(caller).await
    }

    /// One business; the caller must hold a rights row on it
    pub async fn get(
        &self,
        business_id: Uuid,
        caller: Uuid,
    ) -> Result<BusinessAggregate, DomainError> {
        let aggregate = self.find(business_id).await?;
        self.authority.require_member(business_id, caller).await?;
        Ok(aggregate)
    }

    /// Partially update a business, its contact and address; owner only
    pub async fn update(
        &self,
        business_id: Uuid,
        caller: Uuid,
        patch: BusinessPatch,
    ) -> Result<BusinessAggregate, DomainError> {
        let mut aggregate = self.find(business_id).await?;
        self.authority
            .require(business_id, caller, Capability::Owner)
            .await?;

        patch.apply_to(&mut aggregate)?;
        self.ensure_unique(&aggregate, Some(business_id)).await?;
        self.businesses.update_aggregate(&aggregate).await?;

        info!(%business_id, updated_by = %caller, "Business updated");
        Ok(aggregate)
    }

    /// Delete a business with its contact, address and rights rows; owner only
    pub async fn delete(&self, business_id: Uuid, caller: Uuid) -> Result<(), DomainError> {
        self.find(business_id).await?;
        self.authority
            .require(business_id, caller, Capability::Owner)
            .await?;

        if !self.businesses.delete_aggregate(business_id).await? {
            return Err(DomainError::not_found("Business"));
        }
        info!(%business_id, deleted_by = %caller, "Business deleted");
        Ok(())
    }
}
