//! Main token service implementation

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::domain::entities::token::{Claims, TokenKind, TokenPair};
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// Service for issuing and verifying JWT access and refresh tokens
///
/// Signature, issuer and audience are checked by `jsonwebtoken`; expiry and
/// token kind are checked against an explicit instant so that callers (and
/// tests) control the clock through the `*_at` variants.
pub struct TokenService {
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    pub fn new(config: TokenServiceConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiry(&self) -> i64 {
        self.config.access_token_expiry_seconds
    }

    /// Generates a new token pair (access + refresh tokens) for a user
    pub fn issue(&self, user_id: Uuid) -> Result<TokenPair, DomainError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Generates a token pair as if issued at `now`
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<TokenPair, DomainError> {
        let access_token = self.generate_token(user_id, TokenKind::Access, now)?;
        let refresh_token = self.generate_token(user_id, TokenKind::Refresh, now)?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_expiry_seconds,
            self.config.refresh_token_expiry_seconds,
        ))
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// The refresh token is not rotated. Returns the new access token and the
    /// user it was issued for.
    pub fn refresh(&self, refresh_token: &str) -> Result<(String, Uuid), DomainError> {
        self.refresh_at(refresh_token, Utc::now())
    }

    pub fn refresh_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, Uuid), DomainError> {
        let claims = self.verify_at(refresh_token, TokenKind::Refresh, now)?;
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;
        let access_token = self.generate_token(user_id, TokenKind::Access, now)?;
        Ok((access_token, user_id))
    }

    /// Resolves an access token to the id of the user it was issued for
    pub fn resolve_identity(&self, access_token: &str) -> Result<Uuid, DomainError> {
        self.resolve_identity_at(access_token, Utc::now())
    }

    pub fn resolve_identity_at(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, DomainError> {
        let claims = self.verify_at(access_token, TokenKind::Access, now)?;
        claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))
    }

    /// Decodes a token and checks that it is of `expected` kind and usable at `now`
    pub fn verify_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, DomainError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => DomainError::Token(TokenError::InvalidSignature),
                ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::MissingRequiredClaim(_) => {
                    DomainError::Token(TokenError::InvalidClaims)
                }
                _ => DomainError::Token(TokenError::InvalidTokenFormat),
            })?;
        let claims = token_data.claims;

        if claims.token_type != expected {
            return Err(DomainError::Token(TokenError::WrongTokenType {
                expected: expected.to_string(),
            }));
        }
        if claims.is_expired_at(now) {
            return Err(DomainError::Token(TokenError::TokenExpired));
        }
        if !claims.is_valid_at(now) {
            return Err(DomainError::Token(TokenError::TokenNotYetValid));
        }

        Ok(claims)
    }

    fn generate_token(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, DomainError> {
        let lifetime = match kind {
            TokenKind::Access => self.config.access_token_expiry_seconds,
            TokenKind::Refresh => self.config.refresh_token_expiry_seconds,
        };
        let claims = Claims::new(
            user_id,
            kind,
            now,
            lifetime,
            &self.config.issuer,
            &self.config.audience,
        );
        self.encode_jwt(&claims)
    }

    /// Encodes claims into a JWT
    pub(crate) fn encode_jwt(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }
}
