//! Test doubles and fixtures for the authentication service

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::repositories::MockStore;
use crate::services::auth::{AuthService, AuthServiceConfig};
use crate::services::otp::{OtpNotifier, OtpService, OtpServiceConfig};
use crate::services::password::{PasswordHasher, MIN_COST};
use crate::services::token::{TokenService, TokenServiceConfig};

/// Notifier that records every delivered code, or fails every delivery
#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MockNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpNotifier for MockNotifier {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), String> {
        if self.fail {
            return Err("smtp unavailable".to_string());
        }
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct TestContext {
    pub store: Arc<MockStore>,
    pub notifier: Arc<MockNotifier>,
    pub tokens: Arc<TokenService>,
    pub service: AuthService<MockStore>,
}

pub fn create_test_context(notifier: MockNotifier) -> TestContext {
    let store = Arc::new(MockStore::new());
    let notifier = Arc::new(notifier);
    let tokens = Arc::new(TokenService::new(TokenServiceConfig::with_secret(
        "auth-service-test-secret",
    )));
    let otp = Arc::new(OtpService::new(
        store.clone(),
        notifier.clone(),
        OtpServiceConfig::default(),
    ));
    let service = AuthService::new(
        store.clone(),
        tokens.clone(),
        otp,
        PasswordHasher::new(MIN_COST),
        AuthServiceConfig::default(),
    );

    TestContext {
        store,
        notifier,
        tokens,
        service,
    }
}
