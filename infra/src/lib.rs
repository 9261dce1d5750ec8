//! # Infrastructure Layer
//!
//! Concrete implementations of the repository traits declared in `vx_core`
//! plus the collaborators the services need at runtime.
//!
//! ## Architecture
//!
//! - **Database**: MySQL repositories using SQLx, with multi-row writes in
//!   explicit transactions
//! - **Memory**: in-process repositories for tests and `memory://` runs
//! - **Notifier**: OTP delivery
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// In-process repositories
pub mod memory;

/// OTP delivery implementations
pub mod notifier;

pub use memory::MemoryStore;
pub use notifier::LogOtpNotifier;

use vx_core::errors::DomainError;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        DomainError::internal(err.to_string())
    }
}
