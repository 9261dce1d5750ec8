//! Domain-specific error types for authentication, tokens and validation
//!
//! The `Display` text of each variant is the message returned to clients; the
//! presentation layer picks the status code and error code.

use thiserror::Error;

/// Authentication and authorization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("OTP expired")]
    OtpExpired,

    /// Any guard failure: missing or bad token, unknown or inactive user, wrong policy
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidTokenFormat,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Invalid token claims")]
    InvalidClaims,

    /// An access token was presented where a refresh token is required, or the reverse
    #[error("Wrong token type: expected {expected}")]
    WrongTokenType { expected: String },

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid length: {field} (max: {max})")]
    InvalidLength { field: String, max: usize },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Duplicate value: {field}")]
    DuplicateValue { field: String },
}
