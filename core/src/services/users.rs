//! User administration: listing, editing, deleting and promoting accounts

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use vx_shared::validation::{is_valid_email, normalize_email, validators};

use crate::domain::entities::user::{User, UserView};
use crate::errors::{AuthError, DomainError, ValidationError};
use crate::repositories::UserRepository;
use crate::services::password::PasswordHasher;

/// Partial update of a user; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

pub struct UserService<U: UserRepository> {
    users: Arc<U>,
    hasher: PasswordHasher,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: Arc<U>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Every user together with the total count
    pub async fn list(&self) -> Result<(Vec<UserView>, u64), DomainError> {
        let users = self.users.list().await?;
        let total = self.users.count().await?;
        Ok((users.iter().map(User::view).collect(), total))
    }

    pub async fn get(&self, id: Uuid) -> Result<UserView, DomainError> {
        Ok(self.find(id).await?.view())
    }

    async fn find(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    /// Apply `changes` to user `id` on behalf of `caller`
    ///
    /// Users may edit themselves; administrators may edit anyone.
    pub async fn update(
        &self,
        caller: &User,
        id: Uuid,
        changes: UserUpdate,
    ) -> Result<UserView, DomainError> {
        if caller.id != id && !caller.is_admin {
            return Err(AuthError::InsufficientPermissions.into());
        }

        let mut user = self.find(id).await?;

        if let Some(email) = changes.email {
            let email = normalize_email(&email);
            if !is_valid_email(&email) {
                return Err(ValidationError::InvalidEmail.into());
            }
            if email != user.email && self.users.exists_by_email(&email).await? {
                return Err(AuthError::EmailAlreadyExists.into());
            }
            user.email = email;
        }
        if let Some(first_name) = changes.first_name {
            if !validators::not_empty(&first_name) {
                return Err(ValidationError::RequiredField {
                    field: "first_name".to_string(),
                }
                .into());
            }
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            if !validators::not_empty(&last_name) {
                return Err(ValidationError::RequiredField {
                    field: "last_name".to_string(),
                }
                .into());
            }
            user.last_name = last_name;
        }
        if let Some(password) = changes.password {
            if !validators::not_empty(&password) {
                return Err(ValidationError::RequiredField { field: "password".to_string() }.into());
            }
            user.password_hash = self.hasher.hash(&password).await?;
        }
        user.updated_at = Utc::now();

        let user = self.users.update(user).await?;
        info!(user_id = %user.id, updated_by = %caller.id, "User updated");
        Ok(user.view())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.users.delete(id).await? {
            return Err(AuthError::UserNotFound.into());
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Delete the caller's own account
    pub async fn delete_profile(&self, caller: &User) -> Result<(), DomainError> {
        self.delete(caller.id).await
    }

    /// Grant administrative rights to user `id`
    pub async fn make_admin(&self, id: Uuid) -> Result<UserView, DomainError> {
        let mut user = self.find(id).await?;
        user.promote_to_admin();
        let user = self.users.update(user).await?;
        info!(user_id = %user.id, "User promoted to admin");
        Ok(user.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::entities::rights::BusinessUserRights;
    use crate::repositories::{self, MockStore};
    use crate::services::password::MIN_COST;

    async fn setup() -> (Arc<MockStore>, UserService<MockStore>, User, User) {
        let store = Arc::new(MockStore::new());
        let service = UserService::new(store.clone(), PasswordHasher::new(MIN_COST));

        let mut admin =
            User::new("admin@example.com".into(), "Ada".into(), "Min".into(), "h".into());
        admin.is_admin = true;
        let member = User::new("member@example.com".into(), "Mem".into(), "Ber".into(), "h".into());
        let admin = store.create(admin).await.unwrap();
        let member = store.create(member).await.unwrap();
        (store, service, admin, member)
    }

    #[tokio::test]
    async fn test_list_with_total() {
        let (_, service, _, _) = setup().await;
        let (users, total) = service.list().await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let (_, service, _, _) = setup().await;
        assert!(matches!(
            service.get(Uuid::new_v4()).await,
            Err(DomainError::Auth(AuthError::UserNotFound))
        ));
    }

    #[tokio::test]
    async fn test_self_update_normalizes_email() {
        let (_, service, _, member) = setup().await;
        let view = service
            .update(
                &member,
                member.id,
                UserUpdate {
                    email: Some("New.Member@Example.com".into()),
                    first_name: Some("Memo".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(view.email, "new.member@example.com");
        assert_eq!(view.first_name, "Memo");
        assert_eq!(view.last_name, "Ber");
    }

    #[tokio::test]
    async fn test_update_other_user_requires_admin() {
        let (_, service, admin, member) = setup().await;

        let result = service.update(&member, admin.id, UserUpdate::default()).await;
        assert!(matches!(
            result,
            Err(DomainError::Auth(AuthError::InsufficientPermissions))
        ));

        let rename = UserUpdate {
            last_name: Some("X".into()),
            ..Default::default()
        };
        assert!(service.update(&admin, member.id, rename).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let (_, service, _, member) = setup().await;
        let result = service
            .update(
                &member,
                member.id,
                UserUpdate { email: Some("ADMIN@example.com".into()), ..Default::default() },
            )
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Auth(AuthError::EmailAlreadyExists))
        ));
    }

    #[tokio::test]
    async fn test_password_update_is_hashed() {
        let (store, service, _, member) = setup().await;
        service
            .update(
                &member,
                member.id,
                UserUpdate { password: Some("fresh-password".into()), ..Default::default() },
            )
            .await
            .unwrap();

        let stored = store.find_by_id(member.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "fresh-password");
        assert!(PasswordHasher::new(MIN_COST)
            .verify("fresh-password", &stored.password_hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_make_admin_and_delete() {
        let (store, service, _, member) = setup().await;

        let view = service.make_admin(member.id).await.unwrap();
        assert!(view.is_admin);

        service.delete(member.id).await.unwrap();
        assert!(store.find_by_id(member.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete(member.id).await,
            Err(DomainError::Auth(AuthError::UserNotFound))
        ));
    }

    #[tokio::test]
    async fn test_sole_business_owner_cannot_be_deleted() {
        let (store, service, _, member) = setup().await;
        repositories::RightsRepository::create(
            &*store,
            BusinessUserRights::owner(Uuid::new_v4(), member.id),
        )
            .await
            .unwrap();

        assert!(matches!(
            service.delete(member.id).await,
            Err(DomainError::Conflict { .. })
        ));
        assert!(store.find_by_id(member.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_profile() {
        let (store, service, admin, _) = setup().await;
        service.delete_profile(&admin).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
