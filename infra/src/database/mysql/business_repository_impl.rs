//! MySQL implementation of the BusinessRepository trait.
//!
//! Every write spans several tables and runs in one explicit transaction.
//! The transaction handle is passed through the statement helpers; returning
//! early with `?` drops it uncommitted, which rolls the whole write back.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Transaction};
use uuid::Uuid;

use vx_core::domain::entities::business::{
    Address, Business, BusinessAggregate, Contact, UniqueKeys,
};
use vx_core::domain::entities::rights::BusinessUserRights;
use vx_core::errors::{DomainError, ValidationError};
use vx_core::repositories::BusinessRepository;

use super::rights_repository_impl::insert_rights;
use super::{column, uuid_column};
use crate::database::{db_error, duplicate_field};

const AGGREGATE_SELECT: &str = r#"
    SELECT
        b.id, b.legal_name, b.display_name, b.website_link, b.currency,
        b.business_type, b.business_gst, b.business_pan, b.business_logo,
        b.order_system, b.contact_id, b.created_at, b.updated_at,
        c.email AS contact_email, c.phone_code, c.phone_number, c.address_id,
        a.full_address, a.district, a.city, a.country, a.address_state,
        a.postal_code, a.directions
    FROM business b
    JOIN contact c ON c.id = b.contact_id
    JOIN address a ON a.id = c.address_id
"#;

pub struct MySqlBusinessRepository {
    pool: MySqlPool,
}

impl MySqlBusinessRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_aggregate(row: &MySqlRow) -> Result<BusinessAggregate, DomainError> {
        let address = Address {
            id: uuid_column(row, "address_id")?,
            full_address: column(row, "full_address")?,
            district: column(row, "district")?,
            city: column(row, "city")?,
            country: column(row, "country")?,
            address_state: column(row, "address_state")?,
            postal_code: column(row, "postal_code")?,
            directions: column(row, "directions")?,
        };
        let contact = Contact {
            id: uuid_column(row, "contact_id")?,
            email: column(row, "contact_email")?,
            phone_code: column(row, "phone_code")?,
            phone_number: column(row, "phone_number")?,
            address_id: address.id,
        };
        let business = Business {
            id: uuid_column(row, "id")?,
            legal_name: column(row, "legal_name")?,
            display_name: column(row, "display_name")?,
            website_link: column(row, "website_link")?,
            currency: column(row, "currency")?,
            business_type: column(row, "business_type")?,
            business_gst: column(row, "business_gst")?,
            business_pan: column(row, "business_pan")?,
            business_logo: column(row, "business_logo")?,
            order_system: column(row, "order_system")?,
            contact_id: contact.id,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        };
        Ok(BusinessAggregate {
            business,
            contact,
            address,
        })
    }

    /// Map a failed write inside an aggregate transaction
    fn write_error(context: &str, err: sqlx::Error) -> DomainError {
        match duplicate_field(&err) {
            Some(field) => ValidationError::DuplicateValue {
                field: field.to_string(),
            }
            .into(),
            None => db_error(context, err),
        }
    }

    async fn begin(&self) -> Result<Transaction<'static, MySql>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))
    }
}

async fn insert_address(
    tx: &mut Transaction<'_, MySql>,
    address: &Address,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO address (
            id, full_address, district, city, country, address_state, postal_code, directions
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(address.id.to_string())
    .bind(&address.full_address)
    .bind(&address.district)
    .bind(&address.city)
    .bind(&address.country)
    .bind(&address.address_state)
    .bind(&address.postal_code)
    .bind(&address.directions)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_contact(
    tx: &mut Transaction<'_, MySql>,
    contact: &Contact,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contact (id, email, phone_code, phone_number, address_id) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(contact.id.to_string())
    .bind(&contact.email)
    .bind(contact.phone_code)
    .bind(contact.phone_number)
    .bind(contact.address_id.to_string())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_business(
    tx: &mut Transaction<'_, MySql>,
    business: &Business,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO business (
            id, legal_name, display_name, website_link, currency, business_type,
            business_gst, business_pan, business_logo, order_system, contact_id,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(business.id.to_string())
    .bind(&business.legal_name)
    .bind(&business.display_name)
    .bind(&business.website_link)
    .bind(&business.currency)
    .bind(&business.business_type)
    .bind(&business.business_gst)
    .bind(&business.business_pan)
    .bind(&business.business_logo)
    .bind(business.order_system)
    .bind(business.contact_id.to_string())
    .bind(business.created_at)
    .bind(business.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn update_rows(
    tx: &mut Transaction<'_, MySql>,
    aggregate: &BusinessAggregate,
) -> Result<u64, sqlx::Error> {
    let BusinessAggregate {
        business,
        contact,
        address,
    } = aggregate;

    sqlx::query(
        r#"
        UPDATE address SET
            full_address = ?, district = ?, city = ?, country = ?,
            address_state = ?, postal_code = ?, directions = ?
        WHERE id = ?
        "#,
    )
    .bind(&address.full_address)
    .bind(&address.district)
    .bind(&address.city)
    .bind(&address.country)
    .bind(&address.address_state)
    .bind(&address.postal_code)
    .bind(&address.directions)
    .bind(address.id.to_string())
    .execute(&mut **tx)
    .await?;

    sqlx::query("UPDATE contact SET email = ?, phone_code = ?, phone_number = ? WHERE id = ?")
        .bind(&contact.email)
        .bind(contact.phone_code)
        .bind(contact.phone_number)
        .bind(contact.id.to_string())
        .execute(&mut **tx)
        .await?;

    let result = sqlx::query(
        r#"
        UPDATE business SET
            legal_name = ?, display_name = ?, website_link = ?, currency = ?,
            business_type = ?, business_gst = ?, business_pan = ?, business_logo = ?,
            order_system = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&business.legal_name)
    .bind(&business.display_name)
    .bind(&business.website_link)
    .bind(&business.currency)
    .bind(&business.business_type)
    .bind(&business.business_gst)
    .bind(&business.business_pan)
    .bind(&business.business_logo)
    .bind(business.order_system)
    .bind(business.updated_at)
    .bind(business.id.to_string())
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

#[async_trait]
impl BusinessRepository for MySqlBusinessRepository {
    async fn create_aggregate(
        &self,
        aggregate: &BusinessAggregate,
        creator_rights: &BusinessUserRights,
    ) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;

        insert_address(&mut tx, &aggregate.address)
            .await
            .map_err(|e| Self::write_error("Failed to insert address", e))?;
        insert_contact(&mut tx, &aggregate.contact)
            .await
            .map_err(|e| Self::write_error("Failed to insert contact", e))?;
        insert_business(&mut tx, &aggregate.business)
            .await
            .map_err(|e| Self::write_error("Failed to insert business", e))?;
        insert_rights(&mut tx, creator_rights)
            .await
            .map_err(|e| Self::write_error("Failed to insert owner rights", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit business creation", e))?;

        tracing::debug!(business_id = %aggregate.business.id, "Business aggregate inserted");
        Ok(())
    }

    async fn find_aggregate(
        &self,
        business_id: Uuid,
    ) -> Result<Option<BusinessAggregate>, DomainError> {
        let query = format!("{} WHERE b.id = ? LIMIT 1", AGGREGATE_SELECT);
        let row = sqlx::query(&query)
            .bind(business_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Business lookup failed", e))?;

        row.as_ref().map(Self::row_to_aggregate).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BusinessAggregate>, DomainError> {
        let query = format!(
            "{} JOIN business_user_rights r ON r.business_id = b.id \
             WHERE r.user_id = ? ORDER BY b.created_at",
            AGGREGATE_SELECT
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Business listing failed", e))?;

        rows.iter().map(Self::row_to_aggregate).collect()
    }

    async fn find_conflict(
        &self,
        keys: &UniqueKeys,
        exclude: Option<Uuid>,
    ) -> Result<Option<String>, DomainError> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(
            r#"
            SELECT b.legal_name, b.display_name, c.email, c.phone_number
            FROM business b
            JOIN contact c ON c.id = b.contact_id
            WHERE (b.legal_name = ? OR b.display_name = ? OR c.email = ? OR c.phone_number = ?)
              AND b.id <> ?
            "#,
        )
        .bind(&keys.legal_name)
        .bind(&keys.display_name)
        .bind(&keys.contact_email)
        .bind(keys.phone_number)
        .bind(exclude.map(|id| id.to_string()).unwrap_or_default())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Business uniqueness check failed", e))?;

        let field = rows.iter().find_map(|(legal_name, display_name, email, phone_number)| {
            if *legal_name == keys.legal_name {
                Some("legalName")
            } else if *display_name == keys.display_name {
                Some("displayName")
            } else if *email == keys.contact_email {
                Some("email")
            } else if *phone_number == keys.phone_number {
                Some("phoneNumber")
            } else {
                None
            }
        });
        Ok(field.map(str::to_string))
    }

    async fn update_aggregate(&self, aggregate: &BusinessAggregate) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;

        let updated = update_rows(&mut tx, aggregate)
            .await
            .map_err(|e| Self::write_error("Failed to update business", e))?;
        if updated == 0 {
            let (exists,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM business WHERE id = ?")
                .bind(aggregate.business.id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| db_error("Business lookup failed", e))?;
            if exists == 0 {
                return Err(DomainError::not_found("Business"));
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit business update", e))?;
        Ok(())
    }

    async fn delete_aggregate(&self, business_id: Uuid) -> Result<bool, DomainError> {
        let mut tx = self.begin().await?;

        let ids: Option<(String, String)> = sqlx::query_as(
            r#"
            SELECT c.id, c.address_id
            FROM business b
            JOIN contact c ON c.id = b.contact_id
            WHERE b.id = ?
            FOR UPDATE
            "#,
        )
        .bind(business_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Business lookup failed", e))?;

        let Some((contact_id, address_id)) = ids else {
            return Ok(false);
        };

        let statements: [(&str, String); 4] = [
            ("DELETE FROM business_user_rights WHERE business_id = ?", business_id.to_string()),
            ("DELETE FROM business WHERE id = ?", business_id.to_string()),
            ("DELETE FROM contact WHERE id = ?", contact_id),
            ("DELETE FROM address WHERE id = ?", address_id),
        ];
        for (statement, id) in statements {
            sqlx::query(statement)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to delete business", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit business deletion", e))?;

        tracing::debug!(%business_id, "Business aggregate deleted");
        Ok(true)
    }
}
