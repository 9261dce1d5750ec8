//! User repository trait defining the interface for user data persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// Emails passed in are expected to be normalized already (trimmed, lowercased).
///
/// # Example
/// ```no_run
/// # use vx_core::repositories::UserRepository;
/// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
/// match repo.find_by_email("jane@example.com").await? {
///     Some(user) => println!("User found: {}", user.id),
///     None => println!("User not found"),
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their email address
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by their unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// All users, oldest first
    async fn list(&self) -> Result<Vec<User>, DomainError>;

    /// Total number of users
    async fn count(&self) -> Result<u64, DomainError>;

    /// Create a new user in the repository
    ///
    /// # Returns
    /// * `Ok(User)` - The created user
    /// * `Err(DomainError::Auth(AuthError::EmailAlreadyExists))` - Email is taken
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Update an existing user in the repository
    ///
    /// # Returns
    /// * `Err(DomainError::NotFound)` - No user with that id
    /// * `Err(DomainError::Auth(AuthError::EmailAlreadyExists))` - New email is taken
    async fn update(&self, user: User) -> Result<User, DomainError>;

    /// Delete a user along with every rights row that references it
    ///
    /// # Returns
    /// * `Ok(true)` - User was deleted
    /// * `Ok(false)` - User not found
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Check if a user exists with the given email
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError>;

    /// Replace the pending OTP of a user
    ///
    /// # Returns
    /// * `Ok(false)` - No user with that id
    async fn store_otp(
        &self,
        id: Uuid,
        otp: &str,
        expiry: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Confirm the email of a user if, and only if, `otp` is still the pending code
    ///
    /// Setting `email_confirmed` and clearing the OTP happen in one atomic
    /// conditional write, so of two concurrent confirmations with the same code
    /// exactly one observes `Ok(true)`.
    async fn confirm_email_with_otp(&self, id: Uuid, otp: &str) -> Result<bool, DomainError>;
}
