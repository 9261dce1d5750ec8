//! # Volumx API
//!
//! HTTP layer of the Volumx backend: the actix-web application, route
//! handlers, request guards and the mapping of domain errors onto HTTP
//! responses.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use state::{AppState, InMemory, Repositories};

#[cfg(feature = "mysql")]
pub use state::MySql;
