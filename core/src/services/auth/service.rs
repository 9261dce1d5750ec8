//! Main authentication service implementation

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use vx_shared::validation::{is_valid_email, mask_email, normalize_email, validators};

use crate::domain::entities::user::User;
use crate::domain::value_objects::{AuthSession, RefreshedAccess};
use crate::errors::{AuthError, DomainError, ValidationError};
use crate::repositories::UserRepository;
use crate::services::otp::OtpService;
use crate::services::password::PasswordHasher;
use crate::services::token::TokenService;

use super::config::AuthServiceConfig;

/// Input for [`AuthService::register`]
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if validators::not_empty(value) {
        Ok(())
    } else {
        Err(ValidationError::RequiredField {
            field: field.to_string(),
        })
    }
}

/// Authentication service handling registration, login and refresh
pub struct AuthService<U: UserRepository> {
    users: Arc<U>,
    tokens: Arc<TokenService>,
    otp: Arc<OtpService<U>>,
    hasher: PasswordHasher,
    config: AuthServiceConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(
        users: Arc<U>,
        tokens: Arc<TokenService>,
        otp: Arc<OtpService<U>>,
        hasher: PasswordHasher,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            otp,
            hasher,
            config,
        }
    }

    /// Create an account and sign it in
    ///
    /// The email is lowercased before validation and storage. A confirmation
    /// OTP is issued afterwards; failing to deliver it does not fail the
    /// registration.
    pub async fn register(&self, input: Registration) -> Result<AuthSession, DomainError> {
        require("first_name", &input.first_name)?;
        require("last_name", &input.last_name)?;
        require("email", &input.email)?;
        require("password", &input.password)?;

        let email = normalize_email(&input.email);
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }

        if self.users.exists_by_email(&email).await? {
            info!(email = %mask_email(&email), "Registration for existing email rejected");
            return Err(AuthError::EmailAlreadyExists.into());
        }

        let password_hash = self.hasher.hash(&input.password).await?;
        let user = User::new(email, input.first_name, input.last_name, password_hash);
        let user = self.users.create(user).await.map_err(|e| {
            if e.is_internal() {
                error!(error = %e, "Failed to persist new user");
            }
            e
        })?;

        let tokens = self.tokens.issue(user.id)?;

        if self.config.issue_otp_on_register {
            if let Err(e) = self.otp.issue_for(&user, Utc::now()).await {
                warn!(
                    user_id = %user.id,
                    error = %e,
                    "Could not issue confirmation OTP at registration"
                );
            }
        }

        info!(user_id = %user.id, email = %mask_email(&user.email), "User registered");
        Ok(AuthSession::new(user.view(), tokens))
    }

    /// Check credentials and issue a token pair
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        require("email", email)?;
        require("password", password)?;

        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            info!(email = %mask_email(&email), "Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            info!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.tokens.issue(user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok(AuthSession::new(user.view(), tokens))
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccess, DomainError> {
        let (access_token, user_id) = self.tokens.refresh(refresh_token)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        Ok(RefreshedAccess {
            access_token,
            expires_in: self.tokens.access_token_expiry(),
            user: user.view(),
        })
    }

    /// Tokens are stateless; logging out is an acknowledgement only
    pub fn logout(&self) {}
}
