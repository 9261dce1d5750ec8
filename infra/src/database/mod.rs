//! Database module - MySQL implementations using SQLx
//!
//! This module provides the database access layer:
//! - Connection pool management and embedded migrations
//! - Repository implementations for users, business aggregates and rights
//! - Mapping of driver errors onto domain errors

pub mod connection;
pub mod mysql;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::{MySqlBusinessRepository, MySqlRightsRepository, MySqlUserRepository};

use vx_core::errors::DomainError;

/// Unique constraint names and the wire field each one protects
const UNIQUE_CONSTRAINTS: [(&str, &str); 6] = [
    ("uq_users_email", "email"),
    ("uq_contact_email", "email"),
    ("uq_contact_phone_number", "phoneNumber"),
    ("uq_business_legal_name", "legalName"),
    ("uq_business_display_name", "displayName"),
    ("PRIMARY", "userId"),
];

/// Field guarded by the unique constraint a driver error reports, if any
///
/// MySQL does not expose the constraint name separately; it is part of the
/// message: `Duplicate entry 'x' for key 'contact.uq_contact_email'`.
pub(crate) fn duplicate_field(err: &sqlx::Error) -> Option<&'static str> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    if !db_err.is_unique_violation() {
        return None;
    }
    let message = db_err.message();
    UNIQUE_CONSTRAINTS
        .iter()
        .find(|(key, _)| message.contains(key))
        .map(|(_, field)| *field)
        .or(Some("value"))
}

/// Wrap a driver error as an internal domain error, logging the detail
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "{}", context);
    DomainError::internal(format!("{}: {}", context, err))
}
