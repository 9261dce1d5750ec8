//! Value objects returned by the services

pub mod auth_response;

pub use auth_response::{AuthSession, RefreshedAccess};
