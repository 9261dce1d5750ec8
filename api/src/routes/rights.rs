//! Per-user rights on a business under `/business/{id}/user_rights`

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use vx_core::entities::RightsPatch;

use crate::dto::business::{GrantRightsRequest, RightsListResponse};
use crate::dto::{required_value, MessageResponse};
use crate::handlers::ApiResult;
use crate::middleware::CurrentUser;
use crate::state::{AppState, Repositories};

pub fn configure<P: Repositories>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{id}/user_rights")
            .route(web::get().to(list_rights::<P>))
            .route(web::post().to(grant_rights::<P>)),
    )
    .service(
        web::resource("/{id}/user_rights/{user_id}")
            .route(web::get().to(get_rights::<P>))
            .route(web::patch().to(update_rights::<P>))
            .route(web::delete().to(revoke_rights::<P>)),
    );
}

/// GET /business/{id}/user_rights
pub async fn list_rights<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let rights = state.rights.list(path.into_inner(), caller.id()).await?;
    Ok(HttpResponse::Ok().json(RightsListResponse { rights }))
}

/// POST /business/{id}/user_rights
pub async fn grant_rights<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<GrantRightsRequest>,
) -> ApiResult<HttpResponse> {
    let GrantRightsRequest { user_id, flags } = body.into_inner();
    let target = required_value("userId", user_id)?;

    let rights = state
        .rights
        .grant(path.into_inner(), caller.id(), target, flags)
        .await?;
    Ok(HttpResponse::Created().json(rights))
}

/// GET /business/{id}/user_rights/{user_id}
///
/// A user without a row gets an all-false record rather than 404.
pub async fn get_rights<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (business_id, user_id) = path.into_inner();
    let rights = state.rights.view(business_id, caller.id(), user_id).await?;
    Ok(HttpResponse::Ok().json(rights))
}

pub async fn update_rights<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<RightsPatch>,
) -> ApiResult<HttpResponse> {
    let (business_id, user_id) = path.into_inner();
    let rights = state
        .rights
        .update(business_id, caller.id(), user_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(rights))
}

pub async fn revoke_rights<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (business_id, user_id) = path.into_inner();
    state.rights.revoke(business_id, caller.id(), user_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Rights revoked successfully")))
}
