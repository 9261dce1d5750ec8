//! Business and rights DTOs
//!
//! Bodies use camelCase keys. Create requests arrive as one nested document:
//! the business, its `contact`, and the contact's `address`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vx_core::entities::{
    Address, BusinessAggregate, BusinessUserRights, NewAddress, NewBusiness, NewContact,
    RightsPatch,
};
use vx_core::errors::ValidationError;

use super::{required, required_value};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub full_address: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub address_state: Option<String>,
    pub postal_code: Option<String>,
    pub directions: Option<String>,
}

impl AddressRequest {
    fn into_new(self) -> Result<NewAddress, ValidationError> {
        Ok(NewAddress {
            full_address: required("fullAddress", self.full_address)?,
            district: required("district", self.district)?,
            city: required("city", self.city)?,
            country: required("country", self.country)?,
            address_state: required("addressState", self.address_state)?,
            postal_code: required("postalCode", self.postal_code)?,
            directions: required("directions", self.directions)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub email: Option<String>,
    pub phone_code: Option<i32>,
    pub phone_number: Option<i64>,
    pub address: Option<AddressRequest>,
}

impl ContactRequest {
    fn into_new(self) -> Result<NewContact, ValidationError> {
        Ok(NewContact {
            email: required("email", self.email)?,
            phone_code: required_value("phoneCode", self.phone_code)?,
            phone_number: required_value("phoneNumber", self.phone_number)?,
            address: required_value("address", self.address)?.into_new()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessRequest {
    pub legal_name: Option<String>,
    pub display_name: Option<String>,
    pub website_link: Option<String>,
    pub currency: Option<String>,
    pub business_type: Option<String>,
    pub business_gst: Option<String>,
    pub business_pan: Option<String>,
    pub business_logo: Option<String>,
    pub order_system: Option<bool>,
    pub contact: Option<ContactRequest>,
}

impl CreateBusinessRequest {
    /// Presence checks only; lengths and formats are checked by the service
    pub fn into_new(self) -> Result<NewBusiness, ValidationError> {
        Ok(NewBusiness {
            legal_name: required("legalName", self.legal_name)?,
            display_name: required("displayName", self.display_name)?,
            website_link: required("websiteLink", self.website_link)?,
            currency: required("currency", self.currency)?,
            business_type: required("businessType", self.business_type)?,
            business_gst: required("businessGst", self.business_gst)?,
            business_pan: required("businessPan", self.business_pan)?,
            business_logo: required("businessLogo", self.business_logo)?,
            order_system: self.order_system.unwrap_or(true),
            contact: required_value("contact", self.contact)?.into_new()?,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: Uuid,
    pub email: String,
    pub phone_code: i32,
    pub phone_number: i64,
    pub address: Address,
}

/// A business with its contact and address nested inside
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessResponse {
    pub id: Uuid,
    pub legal_name: String,
    pub display_name: String,
    pub website_link: String,
    pub currency: String,
    pub business_type: String,
    pub business_gst: String,
    pub business_pan: String,
    pub business_logo: String,
    pub order_system: bool,
    pub contact: ContactResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BusinessAggregate> for BusinessResponse {
    fn from(aggregate: BusinessAggregate) -> Self {
        let BusinessAggregate {
            business,
            contact,
            address,
        } = aggregate;
        Self {
            id: business.id,
            legal_name: business.legal_name,
            display_name: business.display_name,
            website_link: business.website_link,
            currency: business.currency,
            business_type: business.business_type,
            business_gst: business.business_gst,
            business_pan: business.business_pan,
            business_logo: business.business_logo,
            order_system: business.order_system,
            contact: ContactResponse {
                id: contact.id,
                email: contact.email,
                phone_code: contact.phone_code,
                phone_number: contact.phone_number,
                address,
            },
            created_at: business.created_at,
            updated_at: business.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BusinessListResponse {
    pub businesses: Vec<BusinessResponse>,
    pub total: usize,
}

impl From<Vec<BusinessAggregate>> for BusinessListResponse {
    fn from(aggregates: Vec<BusinessAggregate>) -> Self {
        let businesses: Vec<BusinessResponse> = aggregates.into_iter().map(Into::into).collect();
        Self {
            total: businesses.len(),
            businesses,
        }
    }
}

/// Rights row to create; flags left out are false
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRightsRequest {
    pub user_id: Option<Uuid>,
    #[serde(flatten)]
    pub flags: RightsPatch,
}

#[derive(Debug, Serialize)]
pub struct RightsListResponse {
    pub rights: Vec<BusinessUserRights>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "legalName": "Acme Ltd",
            "displayName": "Acme",
            "websiteLink": "https://acme.example",
            "currency": "INR",
            "businessType": "retail",
            "businessGst": "GST",
            "businessPan": "PAN",
            "businessLogo": "logo.png",
            "contact": {
                "email": "hello@acme.example",
                "phoneCode": 91,
                "phoneNumber": 9876543210i64,
                "address": {
                    "fullAddress": "1 Main Road",
                    "district": "Central",
                    "city": "Mumbai",
                    "country": "India",
                    "addressState": "MH",
                    "postalCode": "400001",
                    "directions": "Near the station"
                }
            }
        })
    }

    #[test]
    fn test_create_request_builds_nested_input() {
        let request: CreateBusinessRequest = serde_json::from_value(payload()).unwrap();
        let input = request.into_new().unwrap();

        assert!(input.order_system);
        assert_eq!(input.contact.phone_number, 9876543210);
        assert_eq!(input.contact.address.postal_code, "400001");
    }

    #[test]
    fn test_missing_nested_field_is_named() {
        let mut value = payload();
        value["contact"]["address"]
            .as_object_mut()
            .unwrap()
            .remove("postalCode");
        let request: CreateBusinessRequest = serde_json::from_value(value).unwrap();

        assert_eq!(
            request.into_new().unwrap_err(),
            ValidationError::RequiredField { field: "postalCode".into() }
        );
    }

    #[test]
    fn test_response_nests_contact_and_address() {
        let aggregate = serde_json::from_value::<CreateBusinessRequest>(payload())
            .unwrap()
            .into_new()
            .unwrap()
            .into_aggregate();
        let value = serde_json::to_value(BusinessResponse::from(aggregate)).unwrap();

        assert_eq!(value["displayName"], "Acme");
        assert_eq!(value["contact"]["email"], "hello@acme.example");
        assert_eq!(value["contact"]["address"]["city"], "Mumbai");
    }

    #[test]
    fn test_grant_request_reads_flat_flags() {
        let user_id = Uuid::new_v4();
        let request: GrantRightsRequest =
            serde_json::from_value(json!({"userId": user_id, "salesRights": true})).unwrap();

        assert_eq!(request.user_id, Some(user_id));
        assert_eq!(request.flags.sales_rights, Some(true));
        assert_eq!(request.flags.owner_rights, None);
    }
}
