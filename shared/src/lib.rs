//! Shared utilities and common types for the Volumx server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response envelope and error codes
//! - Utility functions (email validation and masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, JwtConfig, LoggingConfig, OtpConfig,
    PasswordConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::validation;
