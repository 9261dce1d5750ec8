//! Bearer-token guard for protected scopes.
//!
//! `Guard` wraps a scope or resource and runs before any handler inside it:
//! it reads the `Authorization` header, asks the [`Authorizer`] registered as
//! app data to resolve the caller under the guard's [`AccessPolicy`], and
//! stores the resulting [`CurrentUser`] in the request extensions. A rejected
//! request never reaches the handler.

use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use tracing::error;

use vx_core::entities::User;
use vx_core::errors::{AuthError, DomainError};
use vx_core::services::{bearer_token, AccessPolicy, Authorizer};

use crate::handlers::ApiError;

/// The authorized caller of a guarded request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }
}

/// Middleware factory admitting callers that satisfy a policy
#[derive(Debug, Clone, Copy)]
pub struct Guard {
    policy: AccessPolicy,
}

impl Guard {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    /// Any active user with a valid access token
    pub fn authenticated() -> Self {
        Self::new(AccessPolicy::Authenticated)
    }

    /// Active administrators only
    pub fn admin() -> Self {
        Self::new(AccessPolicy::Admin)
    }
}

impl<S, B> Transform<S, ServiceRequest> for Guard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GuardMiddleware {
            service: Rc::new(service),
            policy: self.policy,
        }))
    }
}

pub struct GuardMiddleware<S> {
    service: Rc<S>,
    policy: AccessPolicy,
}

impl<S, B> Service<ServiceRequest> for GuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let policy = self.policy;
        let token = extract_bearer_token(&req);
        let authorizer = req.app_data::<web::Data<dyn Authorizer>>().cloned();

        Box::pin(async move {
            let outcome = match authorizer {
                Some(authorizer) => authorizer
                    .authorize(token.as_deref(), policy)
                    .await
                    .map_err(ApiError::from),
                None => {
                    error!("Guarded route reached without an authorizer in app data");
                    Err(DomainError::internal("authorizer not configured").into())
                }
            };

            match outcome {
                Ok(user) => {
                    req.extensions_mut().insert(CurrentUser(user));
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Bearer token from the `Authorization` header, if well formed
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    bearer_token(header).map(str::to_string)
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result: Result<Self, ApiError> = req
            .extensions()
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AuthError::Unauthorized.into());
        ready(result)
    }
}
