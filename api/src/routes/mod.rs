//! Route handlers, grouped by resource
//!
//! Each submodule exposes a `configure` function that mounts its handlers and
//! guards under the `/api/v1` scope.

pub mod auth;
pub mod business;
pub mod health;
pub mod rights;
pub mod users;

use actix_web::web;

use crate::state::Repositories;

/// Mount every route group
pub fn configure<P: Repositories>(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .configure(auth::configure::<P>)
                .configure(users::configure::<P>),
        )
        .service(
            web::scope("/business")
                .wrap(crate::middleware::Guard::authenticated())
                .configure(business::configure::<P>)
                .configure(rights::configure::<P>),
        );
}
