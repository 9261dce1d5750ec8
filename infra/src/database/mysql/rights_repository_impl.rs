//! MySQL implementation of the RightsRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Transaction};
use uuid::Uuid;

use vx_core::domain::entities::rights::{BusinessUserRights, RightsFlags, LAST_OWNER_MESSAGE};
use vx_core::errors::{DomainError, ValidationError};
use vx_core::repositories::RightsRepository;

use super::{column, uuid_column};
use crate::database::{db_error, duplicate_field};

const RIGHTS_COLUMNS: &str = r#"
    business_id, user_id, product_rights, inventory_rights, sales_rights,
    sales_pos_rights, suppliers_rights, analytics_view_rights, owner_rights,
    created_at, updated_at
"#;

pub struct MySqlRightsRepository {
    pool: MySqlPool,
}

impl MySqlRightsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_rights(row: &MySqlRow) -> Result<BusinessUserRights, DomainError> {
        Ok(BusinessUserRights {
            business_id: uuid_column(row, "business_id")?,
            user_id: uuid_column(row, "user_id")?,
            flags: RightsFlags {
                product_rights: column(row, "product_rights")?,
                inventory_rights: column(row, "inventory_rights")?,
                sales_rights: column(row, "sales_rights")?,
                sales_pos_rights: column(row, "sales_pos_rights")?,
                suppliers_rights: column(row, "suppliers_rights")?,
                analytics_view_rights: column(row, "analytics_view_rights")?,
                owner_rights: column(row, "owner_rights")?,
            },
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

/// Insert a rights row inside an open transaction
pub(super) async fn insert_rights(
    tx: &mut Transaction<'_, MySql>,
    rights: &BusinessUserRights,
) -> Result<(), sqlx::Error> {
    let flags = &rights.flags;
    sqlx::query(
        r#"
        INSERT INTO business_user_rights (
            business_id, user_id, product_rights, inventory_rights, sales_rights,
            sales_pos_rights, suppliers_rights, analytics_view_rights, owner_rights,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rights.business_id.to_string())
    .bind(rights.user_id.to_string())
    .bind(flags.product_rights)
    .bind(flags.inventory_rights)
    .bind(flags.sales_rights)
    .bind(flags.sales_pos_rights)
    .bind(flags.suppliers_rights)
    .bind(flags.analytics_view_rights)
    .bind(flags.owner_rights)
    .bind(rights.created_at)
    .bind(rights.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Whether `user_id` holds the only owner row of `business_id`
///
/// Locks the owner rows until the transaction ends, so two owners demoting
/// each other concurrently cannot both pass.
pub(super) async fn is_sole_owner(
    tx: &mut Transaction<'_, MySql>,
    business_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let owners: Vec<(String,)> = sqlx::query_as(
        "SELECT user_id FROM business_user_rights \
         WHERE business_id = ? AND owner_rights = TRUE FOR UPDATE",
    )
    .bind(business_id.to_string())
    .fetch_all(&mut **tx)
    .await?;

    let user_id = user_id.to_string();
    Ok(matches!(owners.as_slice(), [(only,)] if *only == user_id))
}

#[async_trait]
impl RightsRepository for MySqlRightsRepository {
    async fn find(
        &self,
        business_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BusinessUserRights>, DomainError> {
        let query = format!(
            "SELECT {} FROM business_user_rights WHERE business_id = ? AND user_id = ? LIMIT 1",
            RIGHTS_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(business_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Rights lookup failed", e))?;

        row.as_ref().map(Self::row_to_rights).transpose()
    }

    async fn list_for_business(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<BusinessUserRights>, DomainError> {
        let query = format!(
            "SELECT {} FROM business_user_rights WHERE business_id = ? ORDER BY created_at",
            RIGHTS_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(business_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Rights listing failed", e))?;

        rows.iter().map(Self::row_to_rights).collect()
    }

    async fn create(&self, rights: BusinessUserRights) -> Result<BusinessUserRights, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        insert_rights(&mut tx, &rights).await.map_err(|e| match duplicate_field(&e) {
            Some(_) => DomainError::from(ValidationError::DuplicateValue {
                field: "userId".to_string(),
            }),
            None => db_error("Failed to insert rights", e),
        })?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit rights", e))?;
        Ok(rights)
    }

    async fn update(&self, rights: BusinessUserRights) -> Result<BusinessUserRights, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        if !rights.is_owner()
            && is_sole_owner(&mut tx, rights.business_id, rights.user_id)
                .await
                .map_err(|e| db_error("Owner lookup failed", e))?
        {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }

        let flags = &rights.flags;
        sqlx::query(
            r#"
            UPDATE business_user_rights SET
                product_rights = ?, inventory_rights = ?, sales_rights = ?,
                sales_pos_rights = ?, suppliers_rights = ?, analytics_view_rights = ?,
                owner_rights = ?, updated_at = ?
            WHERE business_id = ? AND user_id = ?
            "#,
        )
        .bind(flags.product_rights)
        .bind(flags.inventory_rights)
        .bind(flags.sales_rights)
        .bind(flags.sales_pos_rights)
        .bind(flags.suppliers_rights)
        .bind(flags.analytics_view_rights)
        .bind(flags.owner_rights)
        .bind(rights.updated_at)
        .bind(rights.business_id.to_string())
        .bind(rights.user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to update rights", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit rights", e))?;

        // MySQL reports matched-but-unchanged rows as 0 affected
        if self.find(rights.business_id, rights.user_id).await?.is_none() {
            return Err(DomainError::not_found("Rights"));
        }
        Ok(rights)
    }

    async fn delete(&self, business_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        if is_sole_owner(&mut tx, business_id, user_id)
            .await
            .map_err(|e| db_error("Owner lookup failed", e))?
        {
            return Err(DomainError::conflict(LAST_OWNER_MESSAGE));
        }

        let result =
            sqlx::query("DELETE FROM business_user_rights WHERE business_id = ? AND user_id = ?")
                .bind(business_id.to_string())
                .bind(user_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to delete rights", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit rights", e))?;
        Ok(result.rows_affected() > 0)
    }
}
