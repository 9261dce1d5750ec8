//! Business repository trait for the Business → Contact → Address aggregate.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::business::{BusinessAggregate, UniqueKeys};
use crate::domain::entities::rights::BusinessUserRights;
use crate::errors::DomainError;

/// Repository trait for business aggregates
///
/// Every write touches several rows; implementations perform each write in a
/// single transaction so that a failure leaves no partial aggregate behind.
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Insert address, contact, business and the creator's rights row atomically
    async fn create_aggregate(
        &self,
        aggregate: &BusinessAggregate,
        creator_rights: &BusinessUserRights,
    ) -> Result<(), DomainError>;

    /// Load a business with its contact and address
    async fn find_aggregate(
        &self,
        business_id: Uuid,
    ) -> Result<Option<BusinessAggregate>, DomainError>;

    /// Businesses on which `user_id` holds a rights row, oldest first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BusinessAggregate>, DomainError>;

    /// Name of the first unique field already used by another aggregate
    ///
    /// `exclude` is the business being updated, whose own values never conflict.
    /// Returned names are the wire names: `legalName`, `displayName`, `email`,
    /// `phoneNumber`.
    async fn find_conflict(
        &self,
        keys: &UniqueKeys,
        exclude: Option<Uuid>,
    ) -> Result<Option<String>, DomainError>;

    /// Persist the business, contact and address of an existing aggregate atomically
    async fn update_aggregate(&self, aggregate: &BusinessAggregate) -> Result<(), DomainError>;

    /// Delete rights rows, business, contact and address atomically
    ///
    /// # Returns
    /// * `Ok(false)` - No business with that id
    async fn delete_aggregate(&self, business_id: Uuid) -> Result<bool, DomainError>;
}
