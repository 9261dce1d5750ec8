//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token lifetime (1 hour)
pub const ACCESS_TOKEN_EXPIRY_SECONDS: i64 = 60 * 60;

/// Refresh token lifetime (90 days)
pub const REFRESH_TOKEN_EXPIRY_SECONDS: i64 = 90 * 24 * 60 * 60;

/// JWT issuer
pub const JWT_ISSUER: &str = "volumx";

/// JWT audience
pub const JWT_AUDIENCE: &str = "volumx-api";

/// Which of the two token kinds a JWT is
///
/// Access tokens authorize requests; refresh tokens only mint new access tokens.
/// Neither is accepted in place of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,

    /// Access or refresh
    pub token_type: TokenKind,
}

impl Claims {
    /// Creates claims of the given kind, issued at `issued_at` and valid for `lifetime_seconds`
    pub fn new(
        user_id: Uuid,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        lifetime_seconds: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let expiry = issued_at + Duration::seconds(lifetime_seconds);

        Self {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expiry.timestamp(),
            nbf: issued_at.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
        }
    }

    /// Checks if the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Checks if the claims are usable at `now` (after nbf, before exp)
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        now >= self.nbf && now < self.exp
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Access and refresh token issued together at login or registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a token pair with the given lifetimes
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}
