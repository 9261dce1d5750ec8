//! Authentication service module
//!
//! Registration, login and token refresh for email/password accounts.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::{AuthService, Registration};
