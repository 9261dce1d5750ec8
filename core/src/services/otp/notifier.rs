//! Delivery channel for issued codes

use async_trait::async_trait;

/// Trait for OTP delivery integration
#[async_trait]
pub trait OtpNotifier: Send + Sync {
    /// Deliver `code` to the owner of `email`
    async fn deliver(&self, email: &str, code: &str) -> Result<(), String>;
}
