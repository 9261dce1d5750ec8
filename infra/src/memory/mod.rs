//! In-process repositories
//!
//! [`MemoryStore`] implements every repository trait over one set of tables
//! behind a single `tokio::sync::RwLock`. Each multi-row write happens inside
//! one write section, and checks the same unique and foreign-key constraints
//! as the MySQL schema before touching anything, so a rejected write leaves
//! no partial rows.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use vx_core::domain::entities::business::{
    Address, Business, BusinessAggregate, Contact, UniqueKeys,
};
use vx_core::domain::entities::rights::{is_sole_owner, BusinessUserRights, LAST_OWNER_MESSAGE};
use vx_core::domain::entities::user::User;
use vx_core::errors::{AuthError, DomainError, ValidationError};
use vx_core::repositories::{BusinessRepository, RightsRepository, UserRepository};


/// Name equality as the `utf8mb4_unicode_ci` unique keys see it
fn same_name(stored: &str, candidate: &str) -> bool {
    stored.to_lowercase() == candidate.to_lowercase()
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    addresses: HashMap<Uuid, Address>,
    contacts: HashMap<Uuid, Contact>,
    businesses: HashMap<Uuid, Business>,
    rights: HashMap<(Uuid, Uuid), BusinessUserRights>,
}

impl Tables {
    fn aggregate(&self, business: &Business) -> Option<BusinessAggregate> {
        let contact = self.contacts.get(&business.contact_id)?;
        let address = self.addresses.get(&contact.address_id)?;
        Some(BusinessAggregate {
            business: business.clone(),
            contact: contact.clone(),
            address: address.clone(),
        })
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    /// Whether `user_id` is the only owner of some business
    fn sole_owner_anywhere(&self, user_id: Uuid) -> bool {
        self.rights
            .values()
            .filter(|row| row.user_id == user_id)
            .any(|row| is_sole_owner(self.rights.values(), row.business_id, user_id))
    }

    /// First unique field of `keys` already held by a business other than `exclude`
    fn conflict(&self, keys: &UniqueKeys, exclude: Option<Uuid>) -> Option<&'static str> {
        self.businesses
            .values()
            .filter(|b| Some(b.id) != exclude)
            .find_map(|b| {
                if same_name(&b.legal_name, &keys.legal_name) {
                    return Some("legalName");
                }
                if same_name(&b.display_name, &keys.display_name) {
                    return Some("displayName");
                }
                let contact = self.contacts.get(&b.contact_id)?;
                if contact.email == keys.contact_email {
                    Some("email")
                } else if contact.phone_number == keys.phone_number {
                    Some("phoneNumber")
                } else {
                    None
                }
            })
    }
}

/// Shared in-memory tables; clones share state
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored businesses
    pub async fn business_count(&self) -> usize {
        self.tables.read().await.businesses.len()
    }

    /// Number of stored contact rows; equals the business count when consistent
    pub async fn contact_count(&self) -> usize {
        self.tables.read().await.contacts.len()
    }

    /// Number of stored address rows
    pub async fn address_count(&self) -> usize {
        self.tables.read().await.addresses.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.tables.read().await.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(AuthError::EmailAlreadyExists.into());
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(DomainError::not_found("User"));
        }
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(AuthError::EmailAlreadyExists.into());
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.sole_owner_anywhere(id) {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.rights.retain(|(_, user_id), _| *user_id != id);
        Ok(true)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.tables.read().await.email_taken(email, None))
    }

    async fn store_otp(
        &self,
        id: Uuid,
        otp: &str,
        expiry: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(false);
        };
        user.set_otp(otp.to_string(), expiry);
        Ok(true)
    }

    async fn confirm_email_with_otp(&self, id: Uuid, otp: &str) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) if user.otp.as_deref() == Some(otp) => {
                user.confirm_email();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl BusinessRepository for MemoryStore {
    async fn create_aggregate(
        &self,
        aggregate: &BusinessAggregate,
        creator_rights: &BusinessUserRights,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;

        if let Some(field) = tables.conflict(&aggregate.unique_keys(), None) {
            return Err(ValidationError::DuplicateValue {
                field: field.to_string(),
            }
            .into());
        }
        if !tables.users.contains_key(&creator_rights.user_id) {
            return Err(DomainError::internal("rights row references a missing user"));
        }

        tables
            .addresses
            .insert(aggregate.address.id, aggregate.address.clone());
        tables
            .contacts
            .insert(aggregate.contact.id, aggregate.contact.clone());
        tables
            .businesses
            .insert(aggregate.business.id, aggregate.business.clone());
        tables.rights.insert(
            (creator_rights.business_id, creator_rights.user_id),
            creator_rights.clone(),
        );
        Ok(())
    }

    async fn find_aggregate(
        &self,
        business_id: Uuid,
    ) -> Result<Option<BusinessAggregate>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .businesses
            .get(&business_id)
            .and_then(|business| tables.aggregate(business)))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BusinessAggregate>, DomainError> {
        let tables = self.tables.read().await;
        let mut aggregates: Vec<BusinessAggregate> = tables
            .rights
            .keys()
            .filter(|(_, holder)| *holder == user_id)
            .filter_map(|(business_id, _)| tables.businesses.get(business_id))
            .filter_map(|business| tables.aggregate(business))
            .collect();
        aggregates.sort_by_key(|a| a.business.created_at);
        Ok(aggregates)
    }

    async fn find_conflict(
        &self,
        keys: &UniqueKeys,
        exclude: Option<Uuid>,
    ) -> Result<Option<String>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.conflict(keys, exclude).map(str::to_string))
    }

    async fn update_aggregate(&self, aggregate: &BusinessAggregate) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let business_id = aggregate.business.id;

        if !tables.businesses.contains_key(&business_id) {
            return Err(DomainError::not_found("Business"));
        }
        if let Some(field) = tables.conflict(&aggregate.unique_keys(), Some(business_id)) {
            return Err(ValidationError::DuplicateValue {
                field: field.to_string(),
            }
            .into());
        }

        tables
            .addresses
            .insert(aggregate.address.id, aggregate.address.clone());
        tables
            .contacts
            .insert(aggregate.contact.id, aggregate.contact.clone());
        tables
            .businesses
            .insert(business_id, aggregate.business.clone());
        Ok(())
    }

    async fn delete_aggregate(&self, business_id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(business) = tables.businesses.remove(&business_id) else {
            return Ok(false);
        };
        tables.rights.retain(|(owner_of, _), _| *owner_of != business_id);
        if let Some(contact) = tables.contacts.remove(&business.contact_id) {
            tables.addresses.remove(&contact.address_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl RightsRepository for MemoryStore {
    async fn find(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BusinessUserRights>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .rights
            .get(&(business_id, user_id))
            .cloned())
    }

    async fn list_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<BusinessUserRights>, DomainError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<BusinessUserRights> = tables
            .rights
            .values()
            .filter(|r| r.business_id == business_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn create(&self, rights: BusinessUserRights) -> Result<BusinessUserRights, DomainError> {
        let mut tables = self.tables.write().await;
        let key = (rights.business_id, rights.user_id);

        if tables.rights.contains_key(&key) {
            return Err(ValidationError::DuplicateValue {
                field: "userId".to_string(),
            }
            .into());
        }
        if !tables.businesses.contains_key(&rights.business_id)
            || !tables.users.contains_key(&rights.user_id)
        {
            return Err(DomainError::internal("rights row references a missing business or user"));
        }

        tables.rights.insert(key, rights.clone());
        Ok(rights)
    }

    async fn update(&self, rights: BusinessUserRights) -> Result<BusinessUserRights, DomainError> {
        let mut tables = self.tables.write().await;
        let key = (rights.business_id, rights.user_id);
        if !rights.is_owner() && is_sole_owner(tables.rights.values(), key.0, key.1) {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }
        match tables.rights.get_mut(&key) {
            Some(row) => {
                *row = rights.clone();
                Ok(rights)
            }
            None => Err(DomainError::not_found("Rights")),
        }
    }

    async fn delete(&self, business_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        if is_sole_owner(tables.rights.values(), business_id, user_id) {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }
        Ok(tables.rights.remove(&(business_id, user_id)).is_some())
    }
}
