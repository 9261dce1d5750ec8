//! Authentication results handed back to the API layer.

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::UserView;

/// Result of a successful registration or login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    /// Public record of the authenticated user
    pub user: UserView,

    /// Freshly issued access and refresh tokens
    pub tokens: TokenPair,
}

impl AuthSession {
    pub fn new(user: UserView, tokens: TokenPair) -> Self {
        Self { user, tokens }
    }
}

/// Result of exchanging a refresh token
///
/// The refresh token itself is not rotated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshedAccess {
    /// Newly minted access token
    pub access_token: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Public record of the token's owner
    pub user: UserView,
}
