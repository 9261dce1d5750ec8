//! bcrypt password hashing
//!
//! Hashing is CPU-bound, so both operations run on the blocking thread pool.

use tracing::warn;

use crate::errors::DomainError;

/// Lowest cost bcrypt accepts; used by tests
pub const MIN_COST: u32 = 4;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    pub async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("password hashing task failed: {}", e)))?
            .map_err(|e| DomainError::internal(format!("password hashing failed: {}", e)))
    }

    /// Check a plaintext password against a stored hash
    ///
    /// A malformed stored hash never matches.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("password check task failed: {}", e)))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be parsed");
                Ok(false)
            }
        }
    }
}
