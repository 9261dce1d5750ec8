//! Authentication DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use vx_core::errors::ValidationError;
use vx_core::services::Registration;
use vx_core::value_objects::{AuthSession, RefreshedAccess};
use vx_core::entities::UserView;

use super::{required, required_value};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 255))]
    pub first_name: Option<String>,
    #[validate(length(max = 255))]
    pub last_name: Option<String>,
    #[validate(length(max = 255))]
    pub email: Option<String>,
    /// bcrypt ignores everything past 72 bytes
    #[validate(length(max = 72))]
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn into_registration(self) -> Result<Registration, ValidationError> {
        Ok(Registration {
            first_name: required("first_name", self.first_name)?,
            last_name: required("last_name", self.last_name)?,
            email: required("email", self.email)?,
            password: required("password", self.password)?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(max = 255))]
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// `(email, password)` once both are present
    pub fn credentials(self) -> Result<(String, String), ValidationError> {
        Ok((required("email", self.email)?, required("password", self.password)?))
    }
}

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub email: Option<String>,
}

/// A submitted code; clients send it either as a string or as a number
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OtpValue {
    Text(String),
    Number(u64),
}

impl OtpValue {
    /// Numeric submissions are zero-padded back to the six issued digits
    pub fn into_code(self) -> String {
        match self {
            OtpValue::Text(text) => text,
            OtpValue::Number(number) => format!("{:06}", number),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmOtpRequest {
    pub email: Option<String>,
    pub otp: Option<OtpValue>,
}

impl ConfirmOtpRequest {
    /// `(email, code)` once both are present
    pub fn into_parts(self) -> Result<(String, String), ValidationError> {
        let email = required("email", self.email)?;
        let code = required_value("otp", self.otp)?.into_code();
        Ok((email, required("otp", Some(code))?))
    }
}

/// Public user record plus the tokens of the new session
#[derive(Debug, Serialize)]
pub struct UserData {
    #[serde(flatten)]
    pub user: UserView,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

impl From<AuthSession> for UserData {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user,
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    #[serde(rename = "userData")]
    pub user_data: UserData,
}

impl SessionResponse {
    pub fn new(message: &'static str, session: AuthSession) -> Self {
        Self {
            message,
            user_data: session.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub message: &'static str,
    pub user_data: UserView,
}

impl From<RefreshedAccess> for RefreshResponse {
    fn from(refreshed: RefreshedAccess) -> Self {
        Self {
            access_token: refreshed.access_token,
            message: "Token refreshed successfully",
            user_data: refreshed.user,
        }
    }
}
