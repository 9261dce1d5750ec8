//! Middleware applied to route scopes

pub mod auth;

pub use auth::{CurrentUser, Guard};
