//! Request and response bodies of the HTTP API

pub mod auth;
pub mod business;
pub mod user;

use serde::Serialize;

use vx_core::errors::ValidationError;

/// `{"message": ...}` acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Unwrap a presence-checked text field
pub(crate) fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::RequiredField {
            field: field.to_string(),
        }),
    }
}

/// Unwrap a presence-checked non-text field
pub(crate) fn required_value<T>(field: &str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::RequiredField {
        field: field.to_string(),
    })
}
