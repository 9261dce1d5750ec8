//! Request guard: turns a bearer token into an authorized user
//!
//! The HTTP layer runs a guard before any protected handler. Every failure is
//! reported as `AuthError::Unauthorized` so clients cannot distinguish an
//! unknown user from a bad token or a missing privilege.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError};
use crate::repositories::UserRepository;
use crate::services::token::TokenService;

/// Which callers a guarded route admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any active user
    Authenticated,
    /// Active administrators only
    Admin,
}

impl AccessPolicy {
    pub fn permits(&self, user: &User) -> bool {
        match self {
            AccessPolicy::Authenticated => user.is_active,
            AccessPolicy::Admin => user.is_active && user.is_admin,
        }
    }
}

impl std::fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessPolicy::Authenticated => write!(f, "authenticated"),
            AccessPolicy::Admin => write!(f, "admin"),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Object-safe view of the guard used by the HTTP middleware
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Resolve `token` to a user admitted by `policy`
    async fn authorize(
        &self,
        token: Option<&str>,
        policy: AccessPolicy,
    ) -> Result<User, DomainError>;
}

pub struct GuardService<U: UserRepository> {
    users: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U: UserRepository> GuardService<U> {
    pub fn new(users: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Authorize as of `now`
    pub async fn authorize_at(
        &self,
        token: Option<&str>,
        policy: AccessPolicy,
        now: DateTime<Utc>,
    ) -> Result<User, DomainError> {
        let Some(token) = token else {
            debug!(%policy, "Request without bearer token");
            return Err(AuthError::Unauthorized.into());
        };

        let user_id = self.tokens.resolve_identity_at(token, now).map_err(|e| {
            debug!(%policy, error = %e, "Bearer token rejected");
            DomainError::from(AuthError::Unauthorized)
        })?;

        let user = match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(%user_id, "Token subject no longer exists");
                return Err(AuthError::Unauthorized.into());
            }
            Err(e) => {
                warn!(%user_id, error = %e, "User lookup failed while authorizing");
                return Err(AuthError::Unauthorized.into());
            }
        };

        if !policy.permits(&user) {
            debug!(%user_id, %policy, "User not admitted by policy");
            return Err(AuthError::Unauthorized.into());
        }

        Ok(user)
    }
}

#[async_trait]
impl<U: UserRepository + 'static> Authorizer for GuardService<U> {
    async fn authorize(
        &self,
        token: Option<&str>,
        policy: AccessPolicy,
    ) -> Result<User, DomainError> {
        self.authorize_at(token, policy, Utc::now()).await
    }
}
