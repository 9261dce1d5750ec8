//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use vx_core::domain::entities::rights::LAST_OWNER_MESSAGE;
use vx_core::domain::entities::user::User;
use vx_core::errors::{AuthError, DomainError};
use vx_core::repositories::UserRepository;

use super::{column, uuid_column};
use crate::database::{db_error, duplicate_field};

const USER_COLUMNS: &str = r#"
    id, email, password_hash, first_name, last_name, email_confirmed,
    otp, otp_expiry, profile_picture, is_active, is_admin,
    created_at, updated_at
"#;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        Ok(User {
            id: uuid_column(row, "id")?,
            email: column(row, "email")?,
            password_hash: column(row, "password_hash")?,
            first_name: column(row, "first_name")?,
            last_name: column(row, "last_name")?,
            email_confirmed: column(row, "email_confirmed")?,
            otp: column(row, "otp")?,
            otp_expiry: column(row, "otp_expiry")?,
            profile_picture: column(row, "profile_picture")?,
            is_active: column(row, "is_active")?,
            is_admin: column(row, "is_admin")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }

    /// Map a failed write, turning the email unique constraint into a domain error
    fn write_error(context: &str, err: sqlx::Error) -> DomainError {
        match duplicate_field(&err) {
            Some("email") => AuthError::EmailAlreadyExists.into(),
            _ => db_error(context, err),
        }
    }

    async fn fetch_one_by(&self, filter: &str, value: String) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE {} = ? LIMIT 1", USER_COLUMNS, filter);
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("User lookup failed", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_by("email", email.to_string()).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.fetch_one_by("id", id.to_string()).await
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let query = format!("SELECT {} FROM users ORDER BY created_at", USER_COLUMNS);
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("User listing failed", e))?;

        rows.iter().map(Self::row_to_user).collect()
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("User count failed", e))?;
        Ok(count.max(0) as u64)
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name, email_confirmed,
                otp, otp_expiry, profile_picture, is_active, is_admin,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.email_confirmed)
            .bind(&user.otp)
            .bind(user.otp_expiry)
            .bind(&user.profile_picture)
            .bind(user.is_active)
            .bind(user.is_admin)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error("Failed to create user", e))?;

        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            UPDATE users SET
                email = ?,
                password_hash = ?,
                first_name = ?,
                last_name = ?,
                email_confirmed = ?,
                otp = ?,
                otp_expiry = ?,
                profile_picture = ?,
                is_active = ?,
                is_admin = ?,
                updated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.email_confirmed)
            .bind(&user.otp)
            .bind(user.otp_expiry)
            .bind(&user.profile_picture)
            .bind(user.is_active)
            .bind(user.is_admin)
            .bind(user.updated_at)
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| Self::write_error("Failed to update user", e))?;

        // MySQL reports matched-but-unchanged rows as 0 affected
        if result.rows_affected() == 0 && self.find_by_id(user.id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let sole_owner: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT r.business_id FROM business_user_rights r
            WHERE r.user_id = ? AND r.owner_rights = TRUE
              AND NOT EXISTS (
                SELECT 1 FROM business_user_rights o
                WHERE o.business_id = r.business_id
                  AND o.user_id <> r.user_id
                  AND o.owner_rights = TRUE
              )
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Owner lookup failed", e))?;
        if sole_owner.is_some() {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }

        // Rights rows go with the user through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete user", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit user deletion", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let (exists,): (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| db_error("Email lookup failed", e))?;
        Ok(exists != 0)
    }

    async fn store_otp(
        &self,
        id: Uuid,
        otp: &str,
        expiry: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE users SET otp = ?, otp_expiry = ?, updated_at = ? WHERE id = ?",
        )
        .bind(otp)
        .bind(expiry)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store OTP", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn confirm_email_with_otp(&self, id: Uuid, otp: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_confirmed = TRUE, otp = NULL, otp_expiry = NULL, updated_at = ?
            WHERE id = ? AND otp = ?
            "#,
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(otp)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to confirm email", e))?;

        Ok(result.rows_affected() == 1)
    }
}
