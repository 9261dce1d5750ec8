//! Business aggregate CRUD under `/business`
//!
//! The whole scope sits behind the authenticated guard; per-business checks
//! against the caller's rights row happen in the service.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use vx_core::entities::BusinessPatch;

use crate::dto::business::{BusinessListResponse, BusinessResponse, CreateBusinessRequest};
use crate::dto::MessageResponse;
use crate::handlers::ApiResult;
use crate::middleware::CurrentUser;
use crate::state::{AppState, Repositories};

pub fn configure<P: Repositories>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(["", "/"])
            .route(web::post().to(create_business::<P>))
            .route(web::get().to(list_businesses::<P>)),
    )
    .service(
        web::resource("/{id}")
            .route(web::get().to(get_business::<P>))
            .route(web::patch().to(update_business::<P>))
            .route(web::delete().to(delete_business::<P>)),
    );
}

/// POST /business; the creator becomes the owner
pub async fn create_business<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    body: web::Json<CreateBusinessRequest>,
) -> ApiResult<HttpResponse> {
    let input = body.into_inner().into_new()?;
    let aggregate = state.businesses.create(caller.id(), input).await?;
    Ok(HttpResponse::Created().json(BusinessResponse::from(aggregate)))
}

/// GET /business
pub async fn list_businesses<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
) -> ApiResult<HttpResponse> {
    let aggregates = state.businesses.list(caller.id()).await?;
    Ok(HttpResponse::Ok().json(BusinessListResponse::from(aggregates)))
}

pub async fn get_business<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let aggregate = state.businesses.get(path.into_inner(), caller.id()).await?;
    Ok(HttpResponse::Ok().json(BusinessResponse::from(aggregate)))
}

pub async fn update_business<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<BusinessPatch>,
) -> ApiResult<HttpResponse> {
    let aggregate = state
        .businesses
        .update(path.into_inner(), caller.id(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(BusinessResponse::from(aggregate)))
}

pub async fn delete_business<P: Repositories>(
    state: web::Data<AppState<P>>,
    caller: CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.businesses.delete(path.into_inner(), caller.id()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Business deleted successfully")))
}
