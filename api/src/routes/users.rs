//! User administration under `/auth/users`
//!
//! Reads and self-updates need an authenticated caller; listing, deleting and
//! promoting need an administrator.

use actix_web::{guard, web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::dto::user::{UpdateUserRequest, UserListResponse};
use crate::dto::MessageResponse;
use crate::handlers::ApiResult;
use crate::middleware::{CurrentUser, Guard};
use crate::state::{AppState, Repositories};

pub fn configure<P: Repositories>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users")
            .wrap(Guard::admin())
            .route(web::get().to(list_users::<P>)),
    )
    // Same path as below; the method guard routes deletes to the admin-wrapped resource.
    .service(
        web::resource("/users/{id}")
            .guard(guard::Delete())
            .wrap(Guard::admin())
            .route(web::delete().to(delete_user::<P>)),
    )
    .service(
        web::resource("/users/{id}")
            .wrap(Guard::authenticated())
            .route(web::get().to(get_user::<P>))
            .route(web::put().to(update_user::<P>)),
    )
    .service(
        web::resource("/users/{id}/admin")
            .wrap(Guard::admin())
            .route(web::patch().to(make_admin::<P>)),
    );
}

/// GET /auth/users
pub async fn list_users<P: Repositories>(state: web::Data<AppState<P>>) -> ApiResult<HttpResponse> {
    let (users, total_users) = state.users.list().await?;
    Ok(HttpResponse::Ok().json(UserListResponse { users, total_users }))
}

/// GET /auth/users/{id}
pub async fn get_user<P: Repositories>(
    state: web::Data<AppState<P>>,
    _caller: CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = state.users.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// PUT /auth/users/{id}; the caller edits themselves unless they are an admin
pub async fn update_user<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    body.validate()?;

    let user = state
        .users
        .update(&caller.0, path.into_inner(), body.into())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /auth/users/{id}
pub async fn delete_user<P: Repositories>(
    state: web::Data<AppState<P>>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.users.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}

/// PATCH /auth/users/{id}/admin
pub async fn make_admin<P: Repositories>(
    state: web::Data<AppState<P>>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user = state.users.make_admin(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}
