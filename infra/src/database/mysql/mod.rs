//! MySQL repository implementations
//!
//! Identifiers are stored as `CHAR(36)` hyphenated UUID strings and
//! timestamps as `DATETIME(6)` in UTC.

mod business_repository_impl;
mod rights_repository_impl;
mod user_repository_impl;

pub use business_repository_impl::MySqlBusinessRepository;
pub use rights_repository_impl::MySqlRightsRepository;
pub use user_repository_impl::MySqlUserRepository;

use sqlx::mysql::MySqlRow;
use sqlx::{Decode, MySql, Row, Type};
use uuid::Uuid;

use vx_core::errors::DomainError;

/// Read a column, reporting decode failures as internal errors
fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::internal(format!("Failed to get {}: {}", name, e)))
}

fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw)
        .map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", name, e)))
}
