//! Rights repository trait for per-(business, user) rows.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::rights::BusinessUserRights;
use crate::errors::DomainError;

#[async_trait]
pub trait RightsRepository: Send + Sync {
    /// The row for the pair, if one is stored
    async fn find(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BusinessUserRights>, DomainError>;

    /// Every row of a business
    async fn list_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<BusinessUserRights>, DomainError>;

    /// Insert a new row
    ///
    /// # Returns
    /// * `Err(DomainError::ValidationErr(ValidationError::DuplicateValue))` - Pair already has
    ///   a row
    async fn create(&self, rights: BusinessUserRights) -> Result<BusinessUserRights, DomainError>;

    /// Overwrite the flags of an existing row
    async fn update(&self, rights: BusinessUserRights) -> Result<BusinessUserRights, DomainError>;

    /// Remove the row for the pair
    ///
    /// # Returns
    /// * `Ok(false)` - No row was stored
    async fn delete(&self, business_id: Uuid, user_id: Uuid) -> Result<bool, DomainError>;
}
