//! One-time password issue and confirmation for email verification

mod config;
mod notifier;
mod service;

pub use config::OtpServiceConfig;
pub use notifier::OtpNotifier;
pub use service::OtpService;
