//! Configuration for the OTP service

use vx_shared::OtpConfig;

#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Number of digits in a code
    pub code_length: usize,
    /// Minutes a code stays valid
    pub expiry_minutes: i64,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            expiry_minutes: 10,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_length: config.length,
            expiry_minutes: config.expiry_minutes,
        }
    }
}
