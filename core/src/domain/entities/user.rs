//! User entity representing a registered account in the Volumx system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar assigned to every new account until the user uploads one
pub const DEFAULT_PROFILE_PICTURE: &str =
    "http://res.cloudinary.com/dbn9ejpno/image/upload/v1700666059/iuqjx3u5ts4tpvofhdnn.png";

/// User entity representing a registered account
///
/// `otp` and `otp_expiry` are always set together and cleared together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Lowercased email address, unique across users
    pub email: String,

    /// bcrypt hash of the password
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    /// Whether the email address has been confirmed through an OTP
    pub email_confirmed: bool,

    /// Pending one-time password, if any
    pub otp: Option<String>,

    /// Instant after which the pending OTP is no longer accepted
    pub otp_expiry: Option<DateTime<Utc>>,

    /// Profile picture URL
    pub profile_picture: String,

    /// Whether the account may authenticate
    pub is_active: bool,

    /// Whether the account may use administrative routes
    pub is_admin: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, active, unconfirmed, non-admin user
    pub fn new(
        email: String,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            first_name,
            last_name,
            email_confirmed: false,
            otp: None,
            otp_expiry: None,
            profile_picture: DEFAULT_PROFILE_PICTURE.to_string(),
            is_active: true,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stores a pending OTP, replacing any unconsumed one
    pub fn set_otp(&mut self, code: String, expiry: DateTime<Utc>) {
        self.otp = Some(code);
        self.otp_expiry = Some(expiry);
        self.updated_at = Utc::now();
    }

    /// Drops the pending OTP
    pub fn clear_otp(&mut self) {
        self.otp = None;
        self.otp_expiry = None;
        self.updated_at = Utc::now();
    }

    /// Marks the email as confirmed and consumes the pending OTP
    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.clear_otp();
    }

    /// Grants administrative rights
    pub fn promote_to_admin(&mut self) {
        self.is_admin = true;
        self.updated_at = Utc::now();
    }

    /// Whether the pending OTP is past its expiry at `now`
    pub fn otp_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.otp_expiry.map_or(true, |expiry| now > expiry)
    }

    /// Public projection of the user, safe to return to clients
    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

/// Client-facing projection of a [`User`]
///
/// Never carries the password hash or the pending OTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub email_confirmed: bool,
    pub profile_picture: String,
    pub is_active: bool,
    pub is_admin: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email_confirmed: user.email_confirmed,
            profile_picture: user.profile_picture.clone(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
