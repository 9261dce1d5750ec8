//! Token service module for JWT management
//!
//! Issues HS256 access and refresh tokens and resolves them back to a user id.
//! Tokens are stateless; nothing is persisted and there is no revocation list.

mod config;
mod service;


pub use config::TokenServiceConfig;
pub use service::TokenService;
