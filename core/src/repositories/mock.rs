//! Mock repositories for service unit tests
//!
//! A single store implements every repository trait so that aggregate writes
//! and rights rows share one lock, the way a database shares one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::business::{Address, Business, BusinessAggregate, Contact, UniqueKeys};
use crate::domain::entities::rights::{is_sole_owner, BusinessUserRights, LAST_OWNER_MESSAGE};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, ValidationError};

use super::{BusinessRepository, RightsRepository, UserRepository};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    addresses: HashMap<Uuid, Address>,
    contacts: HashMap<Uuid, Contact>,
    businesses: HashMap<Uuid, Business>,
    rights: HashMap<(Uuid, Uuid), BusinessUserRights>,
}

/// Mock store for testing
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<RwLock<State>>,
    failing: Arc<AtomicBool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with an internal error
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub async fn business_count(&self) -> usize {
        self.state.read().await.businesses.len()
    }

    pub async fn contact_count(&self) -> usize {
        self.state.read().await.contacts.len()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::internal("mock store failure"));
        }
        Ok(())
    }
}

fn aggregate_of(state: &State, business: &Business) -> Option<BusinessAggregate> {
    let contact = state.contacts.get(&business.contact_id)?;
    let address = state.addresses.get(&contact.address_id)?;
    Some(BusinessAggregate {
        business: business.clone(),
        contact: contact.clone(),
        address: address.clone(),
    })
}

#[async_trait]
impl UserRepository for MockStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.check()?;
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.check()?;
        let mut users: Vec<User> = self.state.read().await.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        self.check()?;
        Ok(self.state.read().await.users.len() as u64)
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyExists.into());
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user.id) {
            return Err(DomainError::not_found("User"));
        }
        if state.users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(AuthError::EmailAlreadyExists.into());
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let sole_owner = state
            .rights
            .values()
            .filter(|row| row.user_id == id)
            .any(|row| is_sole_owner(state.rights.values(), row.business_id, id));
        if sole_owner {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }
        let removed = state.users.remove(&id).is_some();
        state.rights.retain(|(_, user_id), _| *user_id != id);
        Ok(removed)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        self.check()?;
        Ok(self.state.read().await.users.values().any(|u| u.email == email))
    }

    async fn store_otp(
        &self,
        id: Uuid,
        otp: &str,
        expiry: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        match state.users.get_mut(&id) {
            Some(user) => {
                user.set_otp(otp.to_string(), expiry);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn confirm_email_with_otp(&self, id: Uuid, otp: &str) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        match state.users.get_mut(&id) {
            Some(user) if user.otp.as_deref() == Some(otp) => {
                user.confirm_email();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl BusinessRepository for MockStore {
    async fn create_aggregate(
        &self,
        aggregate: &BusinessAggregate,
        creator_rights: &BusinessUserRights,
    ) -> Result<(), DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        state.addresses.insert(aggregate.address.id, aggregate.address.clone());
        state.contacts.insert(aggregate.contact.id, aggregate.contact.clone());
        state.businesses.insert(aggregate.business.id, aggregate.business.clone());
        state.rights.insert(
            (creator_rights.business_id, creator_rights.user_id),
            creator_rights.clone(),
        );
        Ok(())
    }

    async fn find_aggregate(
        &self,
        business_id: Uuid,
    ) -> Result<Option<BusinessAggregate>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .businesses
            .get(&business_id)
            .and_then(|business| aggregate_of(&state, business)))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BusinessAggregate>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        let mut aggregates: Vec<BusinessAggregate> = state
            .rights
            .keys()
            .filter(|(_, uid)| *uid == user_id)
            .filter_map(|(bid, _)| state.businesses.get(bid))
            .filter_map(|business| aggregate_of(&state, business))
            .collect();
        aggregates.sort_by_key(|a| a.business.created_at);
        Ok(aggregates)
    }

    async fn find_conflict(
        &self,
        keys: &UniqueKeys,
        exclude: Option<Uuid>,
    ) -> Result<Option<String>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        for business in state.businesses.values() {
            if Some(business.id) == exclude {
                continue;
            }
            if business.legal_name.to_lowercase() == keys.legal_name.to_lowercase() {
                return Ok(Some("legalName".to_string()));
            }
            if business.display_name.to_lowercase() == keys.display_name.to_lowercase() {
                return Ok(Some("displayName".to_string()));
            }
            if let Some(contact) = state.contacts.get(&business.contact_id) {
                if contact.email == keys.contact_email {
                    return Ok(Some("email".to_string()));
                }
                if contact.phone_number == keys.phone_number {
                    return Ok(Some("phoneNumber".to_string()));
                }
            }
        }
        Ok(None)
    }

    async fn update_aggregate(&self, aggregate: &BusinessAggregate) -> Result<(), DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        if !state.businesses.contains_key(&aggregate.business.id) {
            return Err(DomainError::not_found("Business"));
        }
        state.addresses.insert(aggregate.address.id, aggregate.address.clone());
        state.contacts.insert(aggregate.contact.id, aggregate.contact.clone());
        state.businesses.insert(aggregate.business.id, aggregate.business.clone());
        Ok(())
    }

    async fn delete_aggregate(&self, business_id: Uuid) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let Some(business) = state.businesses.remove(&business_id) else {
            return Ok(false);
        };
        state.rights.retain(|(bid, _), _| *bid != business_id);
        if let Some(contact) = state.contacts.remove(&business.contact_id) {
            state.addresses.remove(&contact.address_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl RightsRepository for MockStore {
    async fn find(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BusinessUserRights>, DomainError> {
        self.check()?;
        Ok(self.state.read().await.rights.get(&(business_id, user_id)).cloned())
    }

    async fn list_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<BusinessUserRights>, DomainError> {
        self.check()?;
        let state = self.state.read().await;
        Ok(state
            .rights
            .values()
            .filter(|r| r.business_id == business_id)
            .cloned()
            .collect())
    }

    async fn create(&self, rights: BusinessUserRights) -> Result<BusinessUserRights, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let key = (rights.business_id, rights.user_id);
        if state.rights.contains_key(&key) {
            return Err(ValidationError::DuplicateValue {
                field: "userId".to_string(),
            }
            .into());
        }
        state.rights.insert(key, rights.clone());
        Ok(rights)
    }

    async fn update(&self, rights: BusinessUserRights) -> Result<BusinessUserRights, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        let key = (rights.business_id, rights.user_id);
        if !state.rights.contains_key(&key) {
            return Err(DomainError::not_found("Rights"));
        }
        if !rights.is_owner() && is_sole_owner(state.rights.values(), key.0, key.1) {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }
        state.rights.insert(key, rights.clone());
        Ok(rights)
    }

    async fn delete(&self, business_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        self.check()?;
        let mut state = self.state.write().await;
        if is_sole_owner(state.rights.values(), business_id, user_id) {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }
        Ok(state.rights.remove(&(business_id, user_id)).is_some())
    }
}
