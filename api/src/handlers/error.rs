//! Domain error to HTTP response mapping
//!
//! Every failure leaves the API as the shared JSON envelope
//! `{error, message, details?, timestamp}`. Internal faults are logged here
//! and reach the client only as a generic message.

use actix_web::{
    error::JsonPayloadError, http::StatusCode, HttpRequest, HttpResponse, ResponseError,
};
use tracing::{error, warn};

use vx_core::errors::{AuthError, DomainError, TokenError, ValidationError};
use vx_shared::errors::{error_codes, ErrorResponse};

/// Message returned for every internal fault
pub const INTERNAL_ERROR_MESSAGE: &str = "It's not you it's us";

pub type ApiResult<T> = Result<T, ApiError>;

/// Error type returned by every handler and by the guard middleware
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request body could not be read as the expected JSON
    #[error("Invalid request body: {0}")]
    Payload(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<&&str> = field_errors.keys().collect();
        fields.sort_unstable();

        let Some(field) = fields.first().copied() else {
            return ApiError::Payload(errors.to_string());
        };
        let max = field_errors
            .get(*field)
            .and_then(|list| list.first())
            .filter(|violation| violation.code == "length")
            .and_then(|violation| violation.params.get("max"))
            .and_then(|max| max.as_u64());

        let field = field.to_string();
        let err = match max {
            Some(max) => ValidationError::InvalidLength { field, max: max as usize },
            None => ValidationError::InvalidFormat { field },
        };
        ApiError::Domain(err.into())
    }
}

fn validation_status(err: &ValidationError) -> (StatusCode, &'static str) {
    match err {
        ValidationError::DuplicateValue { .. } => (StatusCode::CONFLICT, error_codes::CONFLICT),
        _ => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
    }
}

fn auth_status(err: &AuthError) -> (StatusCode, &'static str) {
    match err {
        AuthError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, error_codes::INVALID_CREDENTIALS)
        }
        AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED),
        AuthError::EmailAlreadyExists => {
            (StatusCode::BAD_REQUEST, error_codes::EMAIL_ALREADY_EXISTS)
        }
        AuthError::InvalidOtp => (StatusCode::BAD_REQUEST, error_codes::OTP_INVALID),
        AuthError::OtpExpired => (StatusCode::BAD_REQUEST, error_codes::OTP_EXPIRED),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, error_codes::FORBIDDEN),
    }
}

fn token_status(err: &TokenError) -> (StatusCode, &'static str) {
    match err {
        TokenError::TokenExpired => (StatusCode::UNAUTHORIZED, error_codes::TOKEN_EXPIRED),
        _ => (StatusCode::UNAUTHORIZED, error_codes::TOKEN_INVALID),
    }
}

impl ApiError {
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Payload(_) => (StatusCode::BAD_REQUEST, error_codes::BAD_REQUEST),
            ApiError::Domain(err) => match err {
                DomainError::Auth(e) => auth_status(e),
                DomainError::Token(e) => token_status(e),
                DomainError::ValidationErr(e) => validation_status(e),
                DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
                DomainError::Conflict { .. } => (StatusCode::CONFLICT, error_codes::CONFLICT),
                DomainError::Internal { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
                }
            },
        }
    }

    /// The envelope sent to the client
    pub fn to_body(&self) -> ErrorResponse {
        let (status, code) = self.classify();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return ErrorResponse::new(code, INTERNAL_ERROR_MESSAGE);
        }

        let response = ErrorResponse::new(code, self.to_string());
        match self {
            ApiError::Domain(DomainError::ValidationErr(
                ValidationError::RequiredField { field }
                | ValidationError::InvalidFormat { field }
                | ValidationError::DuplicateValue { field },
            )) => response.add_detail("field", field),
            ApiError::Domain(DomainError::ValidationErr(ValidationError::InvalidLength {
                field,
                max,
            })) => response.add_detail("field", field).add_detail("max", max),
            _ => response,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.classify().0
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed with internal error");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }
        HttpResponse::build(status).json(self.to_body())
    }
}

/// `JsonConfig` error handler: malformed bodies get the JSON envelope with 400
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Payload(err.to_string()).into()
}
