//! Registration, OTP confirmation, login, token refresh and logout
//!
//! Everything here is public except `DELETE /profile`, which is admin-guarded.
//! `/refresh` authenticates with the refresh token itself rather than the guard.

use actix_web::{http::header::AUTHORIZATION, web, HttpRequest, HttpResponse};
use tracing::info;
use validator::Validate;

use vx_core::errors::AuthError;
use vx_core::services::bearer_token;

use crate::dto::auth::{
    ConfirmOtpRequest, LoginRequest, RefreshResponse, RegisterRequest, SendOtpRequest,
    SessionResponse,
};
use crate::dto::{required, MessageResponse};
use crate::handlers::ApiResult;
use crate::middleware::{CurrentUser, Guard};
use crate::state::{AppState, Repositories};

pub fn configure<P: Repositories>(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register::<P>))
        .route("/send_otp", web::post().to(send_otp::<P>))
        .route("/confirm_otp", web::post().to(confirm_otp::<P>))
        .route("/login", web::post().to(login::<P>))
        .route("/refresh", web::post().to(refresh::<P>))
        .route("/logout", web::post().to(logout::<P>))
        .service(
            web::resource("/profile")
                .wrap(Guard::admin())
                .route(web::delete().to(delete_profile::<P>)),
        );
}

/// POST /auth/register
///
/// Creates the account, signs it in and sends a confirmation code. Responds
/// 201 with the user record and both tokens under `userData`.
pub async fn register<P: Repositories>(
    state: web::Data<AppState<P>>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let session = state.auth.register(body.into_registration()?).await?;
    Ok(HttpResponse::Created().json(SessionResponse::new("User registered successfully.", session)))
}

/// POST /auth/send_otp
pub async fn send_otp<P: Repositories>(
    state: web::Data<AppState<P>>,
    body: web::Json<SendOtpRequest>,
) -> ApiResult<HttpResponse> {
    let email = required("email", body.into_inner().email)?;
    state.otp.issue(&email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("OTP sent successfully")))
}

/// POST /auth/confirm_otp
pub async fn confirm_otp<P: Repositories>(
    state: web::Data<AppState<P>>,
    body: web::Json<ConfirmOtpRequest>,
) -> ApiResult<HttpResponse> {
    let (email, code) = body.into_inner().into_parts()?;
    state.otp.confirm(&email, &code).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Email confirmed successfully")))
}

/// POST /auth/login
pub async fn login<P: Repositories>(
    state: web::Data<AppState<P>>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let (email, password) = body.credentials()?;
    let session = state.auth.login(&email, &password).await?;
    Ok(HttpResponse::Ok().json(SessionResponse::new("Logged in successfully", session)))
}

/// POST /auth/refresh with `Authorization: Bearer <refresh token>`
///
/// The refresh token is not rotated.
pub async fn refresh<P: Repositories>(
    req: HttpRequest,
    state: web::Data<AppState<P>>,
) -> ApiResult<HttpResponse> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::Unauthorized)?;

    let refreshed = state.auth.refresh(token).await?;
    Ok(HttpResponse::Ok().json(RefreshResponse::from(refreshed)))
}

/// POST /auth/logout
///
/// Tokens are stateless; the client discards them.
pub async fn logout<P: Repositories>(state: web::Data<AppState<P>>) -> HttpResponse {
    state.auth.logout();
    HttpResponse::Ok().json(MessageResponse::new("Logged out successfully"))
}

/// DELETE /auth/profile
pub async fn delete_profile<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
) -> ApiResult<HttpResponse> {
    state.users.delete_profile(&caller.0).await?;
    info!(user_id = %caller.id(), "Profile deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Profile deleted successfully")))
}
