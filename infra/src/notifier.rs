//! Logging OTP notifier
//!
//! Writes issued codes to the log instead of sending mail. Used for local
//! runs and tests; it keeps a delivery counter so tests can observe sends.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use vx_core::services::OtpNotifier;
use vx_shared::validation::mask_email;

#[derive(Clone, Default)]
pub struct LogOtpNotifier {
    delivered: Arc<AtomicU64>,
    /// Include the code itself in the log output (debug level)
    reveal_code: bool,
}

impl LogOtpNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that also logs the code, for local development
    pub fn revealing() -> Self {
        Self {
            reveal_code: true,
            ..Self::default()
        }
    }

    /// Number of codes handed over so far
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OtpNotifier for LogOtpNotifier {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), String> {
        if email.is_empty() {
            return Err("no recipient".to_string());
        }

        self.delivered.fetch_add(1, Ordering::SeqCst);
        info!(email = %mask_email(email), "OTP ready for delivery");
        if self.reveal_code {
            debug!(email = %mask_email(email), %code, "OTP code");
        }
        Ok(())
    }
}
