//! Business aggregate: a business, its contact and the contact's address.
//!
//! The three records are created and deleted together. Field names serialize in
//! camelCase, which is the wire format clients already use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vx_shared::validation::{is_valid_email, normalize_email, validators};

use crate::errors::ValidationError;

/// Maximum length of free-text columns
pub const MAX_TEXT_LEN: usize = 255;
/// Maximum length of the legal and display names
pub const MAX_NAME_LEN: usize = 50;
/// Maximum length of the business type, GST and PAN identifiers
pub const MAX_CODE_LEN: usize = 50;
/// Maximum length of the country name
pub const MAX_COUNTRY_LEN: usize = 50;
/// Maximum length of a postal code
pub const MAX_POSTAL_CODE_LEN: usize = 10;
/// Maximum length of a currency code
pub const MAX_CURRENCY_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub full_address: String,
    pub district: String,
    pub city: String,
    pub country: String,
    pub address_state: String,
    pub postal_code: String,
    pub directions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    /// Unique across contacts
    pub email: String,
    pub phone_code: i32,
    /// Unique across contacts
    pub phone_number: i64,
    pub address_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: Uuid,
    /// Unique across businesses
    pub legal_name: String,
    /// Unique across businesses
    pub display_name: String,
    pub website_link: String,
    pub currency: String,
    pub business_type: String,
    pub business_gst: String,
    pub business_pan: String,
    pub business_logo: String,
    pub order_system: bool,
    pub contact_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A business together with the records it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessAggregate {
    pub business: Business,
    pub contact: Contact,
    pub address: Address,
}

/// Values that must be unique across all stored aggregates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKeys {
    pub legal_name: String,
    pub display_name: String,
    pub contact_email: String,
    pub phone_number: i64,
}

impl BusinessAggregate {
    /// The uniqueness-constrained values of this aggregate
    pub fn unique_keys(&self) -> UniqueKeys {
        UniqueKeys {
            legal_name: self.business.legal_name.clone(),
            display_name: self.business.display_name.clone(),
            contact_email: self.contact.email.clone(),
            phone_number: self.contact.phone_number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub full_address: String,
    pub district: String,
    pub city: String,
    pub country: String,
    pub address_state: String,
    pub postal_code: String,
    pub directions: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub email: String,
    pub phone_code: i32,
    pub phone_number: i64,
    pub address: NewAddress,
}

/// Validated-on-build input for creating a business aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBusiness {
    pub legal_name: String,
    pub display_name: String,
    pub website_link: String,
    pub currency: String,
    pub business_type: String,
    pub business_gst: String,
    pub business_pan: String,
    pub business_logo: String,
    pub order_system: bool,
    pub contact: NewContact,
}

fn check_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if !validators::not_empty(value) {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }
    if !validators::length_between(value, 1, max) {
        return Err(ValidationError::InvalidLength {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn check_contact_email(email: &str) -> Result<(), ValidationError> {
    check_text("email", email, MAX_TEXT_LEN)?;
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

impl NewAddress {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("fullAddress", &self.full_address, MAX_TEXT_LEN)?;
        check_text("district", &self.district, MAX_TEXT_LEN)?;
        check_text("city", &self.city, MAX_TEXT_LEN)?;
        check_text("country", &self.country, MAX_COUNTRY_LEN)?;
        check_text("addressState", &self.address_state, MAX_TEXT_LEN)?;
        check_text("postalCode", &self.postal_code, MAX_POSTAL_CODE_LEN)?;
        check_text("directions", &self.directions, MAX_TEXT_LEN)
    }
}

impl NewContact {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_contact_email(&normalize_email(&self.email))?;
        self.address.validate()
    }
}

impl NewBusiness {
    /// Checks presence and length of every field in the nested payload
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("legalName", &self.legal_name, MAX_NAME_LEN)?;
        check_text("displayName", &self.display_name, MAX_NAME_LEN)?;
        check_text("websiteLink", &self.website_link, MAX_TEXT_LEN)?;
        check_text("currency", &self.currency, MAX_CURRENCY_LEN)?;
        check_text("businessType", &self.business_type, MAX_CODE_LEN)?;
        check_text("businessGst", &self.business_gst, MAX_CODE_LEN)?;
        check_text("businessPan", &self.business_pan, MAX_CODE_LEN)?;
        check_text("businessLogo", &self.business_logo, MAX_TEXT_LEN)?;
        self.contact.validate()
    }

    /// Materializes the aggregate with fresh identifiers
    ///
    /// The contact email is normalized the same way user emails are.
    pub fn into_aggregate(self) -> BusinessAggregate {
        let now = Utc::now();
        let address = Address {
            id: Uuid::new_v4(),
            full_address: self.contact.address.full_address,
            district: self.contact.address.district,
            city: self.contact.address.city,
            country: self.contact.address.country,
            address_state: self.contact.address.address_state,
            postal_code: self.contact.address.postal_code,
            directions: self.contact.address.directions,
        };
        let contact = Contact {
            id: Uuid::new_v4(),
            email: normalize_email(&self.contact.email),
            phone_code: self.contact.phone_code,
            phone_number: self.contact.phone_number,
            address_id: address.id,
        };
        let business = Business {
            id: Uuid::new_v4(),
            legal_name: self.legal_name,
            display_name: self.display_name,
            website_link: self.website_link,
            currency: self.currency,
            business_type: self.business_type,
            business_gst: self.business_gst,
            business_pan: self.business_pan,
            business_logo: self.business_logo,
            order_system: self.order_system,
            contact_id: contact.id,
            created_at: now,
            updated_at: now,
        };

        BusinessAggregate {
            business,
            contact,
            address,
        }
    }
}

/// Partial update of an address; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatch {
    pub full_address: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub address_state: Option<String>,
    pub postal_code: Option<String>,
    pub directions: Option<String>,
}

/// Partial update of a contact and, optionally, its address
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    pub email: Option<String>,
    pub phone_code: Option<i32>,
    pub phone_number: Option<i64>,
    pub address: Option<AddressPatch>,
}

/// Partial update of a business aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPatch {
    pub legal_name: Option<String>,
    pub display_name: Option<String>,
    pub website_link: Option<String>,
    pub currency: Option<String>,
    pub business_type: Option<String>,
    pub business_gst: Option<String>,
    pub business_pan: Option<String>,
    pub business_logo: Option<String>,
    pub order_system: Option<bool>,
    pub contact: Option<ContactPatch>,
}

fn patch_text(
    target: &mut String,
    value: &Option<String>,
    field: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        check_text(field, value, max)?;
        *target = value.clone();
    }
    Ok(())
}

impl BusinessPatch {
    /// Applies the patch to `aggregate`, validating each supplied field
    ///
    /// On error the aggregate may be partially modified; callers apply patches
    /// to a copy.
    pub fn apply_to(&self, aggregate: &mut BusinessAggregate) -> Result<(), ValidationError> {
        let business = &mut aggregate.business;
        patch_text(&mut business.legal_name, &self.legal_name, "legalName", MAX_NAME_LEN)?;
        patch_text(&mut business.display_name, &self.display_name, "displayName", MAX_NAME_LEN)?;
        patch_text(&mut business.website_link, &self.website_link, "websiteLink", MAX_TEXT_LEN)?;
        patch_text(&mut business.currency, &self.currency, "currency", MAX_CURRENCY_LEN)?;
        patch_text(&mut business.business_type, &self.business_type, "businessType", MAX_CODE_LEN)?;
        patch_text(&mut business.business_gst, &self.business_gst, "businessGst", MAX_CODE_LEN)?;
        patch_text(&mut business.business_pan, &self.business_pan, "businessPan", MAX_CODE_LEN)?;
        patch_text(&mut business.business_logo, &self.business_logo, "businessLogo", MAX_TEXT_LEN)?;
        if let Some(order_system) = self.order_system {
            business.order_system = order_system;
        }
        business.updated_at = Utc::now();

        let Some(contact_patch) = &self.contact else {
            return Ok(());
        };

        let contact = &mut aggregate.contact;
        if let Some(email) = &contact_patch.email {
            let email = normalize_email(email);
            check_contact_email(&email)?;
            contact.email = email;
        }
        if let Some(phone_code) = contact_patch.phone_code {
            contact.phone_code = phone_code;
        }
        if let Some(phone_number) = contact_patch.phone_number {
            contact.phone_number = phone_number;
        }

        if let Some(patch) = &contact_patch.address {
            let address = &mut aggregate.address;
            patch_text(
                &mut address.full_address,
                &patch.full_address,
                "fullAddress",
                MAX_TEXT_LEN,
            )?;
            patch_text(&mut address.district, &patch.district, "district", MAX_TEXT_LEN)?;
            patch_text(&mut address.city, &patch.city, "city", MAX_TEXT_LEN)?;
            patch_text(&mut address.country, &patch.country, "country", MAX_COUNTRY_LEN)?;
            patch_text(
                &mut address.address_state,
                &patch.address_state,
                "addressState",
                MAX_TEXT_LEN,
            )?;
            patch_text(
                &mut address.postal_code,
                &patch.postal_code,
                "postalCode",
                MAX_POSTAL_CODE_LEN,
            )?;
            patch_text(&mut address.directions, &patch.directions, "directions", MAX_TEXT_LEN)?;
        }

        Ok(())
    }
}
