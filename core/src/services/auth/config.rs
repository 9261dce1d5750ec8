//! Configuration for the authentication service

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Whether registration also issues an email confirmation OTP
    pub issue_otp_on_register: bool,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            issue_otp_on_register: true,
        }
    }
}
