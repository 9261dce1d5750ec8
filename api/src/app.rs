//! Application factory
//!
//! Builds the actix-web `App` around an [`AppState`]. The binary and the
//! integration tests both go through [`create_app`], so the tests exercise the
//! same routing, guards and error handling as production.

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    error::PathError,
    web, App, Error, HttpRequest,
};

use vx_core::errors::DomainError;
use vx_core::services::Authorizer;

use crate::handlers::{json_error_handler, ApiError};
use crate::routes;
use crate::state::{AppState, Repositories};

/// Request body limit when none is configured
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 256 * 1024;

fn path_error_handler(err: PathError, _req: &HttpRequest) -> Error {
    tracing::debug!(error = %err, "Unparseable path parameter");
    ApiError::from(DomainError::not_found("Resource")).into()
}

/// Create the application with every route, guard and extractor config
pub fn create_app<P: Repositories>(
    state: web::Data<AppState<P>>,
    authorizer: web::Data<dyn Authorizer>,
    max_payload_size: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(authorizer)
        .app_data(
            web::JsonConfig::default()
                .limit(max_payload_size)
                .error_handler(json_error_handler),
        )
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .route("/health", web::get().to(routes::health::health_check))
        .service(web::scope("/api/v1").configure(routes::configure::<P>))
}
