//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError, ValidationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The write would leave the stored state inconsistent
    #[error("{message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Whether the error reflects a server-side fault rather than a bad request
    pub fn is_internal(&self) -> bool {
        matches!(self, DomainError::Internal { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid email or password");
        assert_eq!(AuthError::InvalidOtp.to_string(), "Invalid OTP");
        assert_eq!(AuthError::OtpExpired.to_string(), "OTP expired");
    }

    #[test]
    fn test_transparent_bridge_keeps_message() {
        let error: DomainError = AuthError::EmailAlreadyExists.into();
        assert_eq!(error.to_string(), "Email already exists");

        let error: DomainError = TokenError::TokenExpired.into();
        assert!(matches!(error, DomainError::Token(TokenError::TokenExpired)));
    }

    #[test]
    fn test_validation_error_with_fields() {
        let error = ValidationError::InvalidLength {
            field: "postalCode".to_string(),
            max: 10,
        };
        assert_eq!(error.to_string(), "Invalid length: postalCode (max: 10)");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(DomainError::not_found("User").to_string(), "User not found");
        assert!(DomainError::internal("db down").is_internal());
        assert!(!DomainError::conflict("last owner").is_internal());
        assert_eq!(DomainError::conflict("last owner").to_string(), "last owner");
    }
}
