//! OTP service implementation

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::Rng;
use tracing::{info, warn};

use vx_shared::validation::{mask_email, normalize_email};

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError};
use crate::repositories::UserRepository;

use super::config::OtpServiceConfig;
use super::notifier::OtpNotifier;

/// Issues numeric one-time passwords and confirms them exactly once
pub struct OtpService<U: UserRepository> {
    users: Arc<U>,
    notifier: Arc<dyn OtpNotifier>,
    config: OtpServiceConfig,
}

impl<U: UserRepository> OtpService<U> {
    pub fn new(users: Arc<U>, notifier: Arc<dyn OtpNotifier>, config: OtpServiceConfig) -> Self {
        Self {
            users,
            notifier,
            config,
        }
    }

    /// Generate a random numeric code; leading zeros are kept
    pub fn generate_code(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.config.code_length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Issue a fresh code to the user registered under `email`
    pub async fn issue(&self, email: &str) -> Result<String, DomainError> {
        self.issue_at(email, Utc::now()).await
    }

    pub async fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String, DomainError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        self.issue_for(&user, now).await
    }

    /// Store a new code for `user`, replacing any unconsumed one, and deliver it
    pub async fn issue_for(&self, user: &User, now: DateTime<Utc>) -> Result<String, DomainError> {
        let code = self.generate_code();
        let expiry = now + Duration::minutes(self.config.expiry_minutes);

        if !self.users.store_otp(user.id, &code, expiry).await? {
            return Err(AuthError::UserNotFound.into());
        }

        self.notifier
            .deliver(&user.email, &code)
            .await
            .map_err(|e| {
                warn!(email = %mask_email(&user.email), error = %e, "OTP delivery failed");
                DomainError::internal(format!("OTP delivery failed: {}", e))
            })?;

        info!(
            user_id = %user.id,
            email = %mask_email(&user.email),
            expires_at = %expiry,
            "OTP issued"
        );
        Ok(code)
    }

    /// Confirm the email of the user registered under `email` with `submitted`
    pub async fn confirm(&self, email: &str, submitted: &str) -> Result<(), DomainError> {
        self.confirm_at(email, submitted, Utc::now()).await
    }

    pub async fn confirm_at(
        &self,
        email: &str,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let Some(stored) = user.otp.as_deref() else {
            return Err(AuthError::InvalidOtp.into());
        };
        if !constant_time_eq(stored.as_bytes(), submitted.trim().as_bytes()) {
            return Err(AuthError::InvalidOtp.into());
        }
        if user.otp_expired_at(now) {
            return Err(AuthError::OtpExpired.into());
        }

        // Conditional on the code still being pending; a concurrent confirmation
        // that got there first leaves nothing to match.
        if !self.users.confirm_email_with_otp(user.id, stored).await? {
            return Err(AuthError::InvalidOtp.into());
        }

        info!(user_id = %user.id, "Email confirmed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::repositories::MockStore;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl OtpNotifier for RecordingNotifier {
        async fn deliver(&self, email: &str, code: &str) -> Result<(), String> {
            if self.fail {
                return Err("mailbox unavailable".to_string());
            }
            self.sent.lock().await.push((email.to_string(), code.to_string()));
            Ok(())
        }
    }

    async fn setup(fail: bool) -> (Arc<MockStore>, Arc<RecordingNotifier>, OtpService<MockStore>) {
        let store = Arc::new(MockStore::new());
        let user = User::new(
            "jane@example.com".to_string(),
            "Jane".to_string(),
            "Doe".to_string(),
            "hash".to_string(),
        );
        UserRepository::create(&*store, user).await.unwrap();

        let notifier = Arc::new(RecordingNotifier {
            fail,
            ..Default::default()
        });
        let service = OtpService::new(store.clone(), notifier.clone(), OtpServiceConfig::default());
        (store, notifier, service)
    }

    #[tokio::test]
    async fn test_generate_code_shape() {
        let (_, _, service) = setup(false).await;
        for _ in 0..50 {
            let code = service.generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_issue_stores_and_delivers() {
        let (store, notifier, service) = setup(false).await;

        let code = service.issue("JANE@example.com").await.unwrap();

        let user = store.find_by_email("jane@example.com").await.unwrap().unwrap();
        assert_eq!(user.otp.as_deref(), Some(code.as_str()));
        assert!(user.otp_expiry.is_some());
        let sent = notifier.sent.lock().await;
        assert_eq!(sent.as_slice(), &[("jane@example.com".to_string(), code)]);
    }

    #[tokio::test]
    async fn test_issue_for_unknown_email() {
        let (_, _, service) = setup(false).await;
        assert!(matches!(
            service.issue("nobody@example.com").await,
            Err(DomainError::Auth(AuthError::UserNotFound))
        ));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_internal() {
        let (_, _, service) = setup(true).await;
        let result = service.issue("jane@example.com").await;
        assert!(matches!(result, Err(DomainError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_confirm_once_then_replay_fails() {
        let (store, _, service) = setup(false).await;
        let code = service.issue("jane@example.com").await.unwrap();

        service.confirm("jane@example.com", &code).await.unwrap();

        let user = store.find_by_email("jane@example.com").await.unwrap().unwrap();
        assert!(user.email_confirmed);
        assert!(user.otp.is_none());
        assert!(user.otp_expiry.is_none());

        assert!(matches!(
            service.confirm("jane@example.com", &code).await,
            Err(DomainError::Auth(AuthError::InvalidOtp))
        ));
    }

    #[tokio::test]
    async fn test_wrong_code() {
        let (_, _, service) = setup(false).await;
        let code = service.issue("jane@example.com").await.unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        assert!(matches!(
            service.confirm("jane@example.com", wrong).await,
            Err(DomainError::Auth(AuthError::InvalidOtp))
        ));
    }

    #[tokio::test]
    async fn test_no_pending_code() {
        let (_, _, service) = setup(false).await;
        assert!(matches!(
            service.confirm("jane@example.com", "123456").await,
            Err(DomainError::Auth(AuthError::InvalidOtp))
        ));
    }

    #[tokio::test]
    async fn test_expired_code() {
        let (_, _, service) = setup(false).await;
        let issued_at = Utc::now();
        let code = service.issue_at("jane@example.com", issued_at).await.unwrap();

        let result = service
            .confirm_at("jane@example.com", &code, issued_at + Duration::minutes(11))
            .await;
        assert!(matches!(result, Err(DomainError::Auth(AuthError::OtpExpired))));
    }

    #[tokio::test]
    async fn test_reissue_overwrites_previous_code() {
        let (_, _, service) = setup(false).await;
        let issued_at = Utc::now();
        let first = service.issue_at("jane@example.com", issued_at).await.unwrap();
        let second = service.issue_at("jane@example.com", issued_at).await.unwrap();

        if first != second {
            assert!(matches!(
                service.confirm("jane@example.com", &first).await,
                Err(DomainError::Auth(AuthError::InvalidOtp))
            ));
        }
        service.confirm("jane@example.com", &second).await.unwrap();
    }

    #[tokio::test]
    async fn test_confirm_unknown_email() {
        let (_, _, service) = setup(false).await;
        assert!(matches!(
            service.confirm("ghost@example.com", "123456").await,
            Err(DomainError::Auth(AuthError::UserNotFound))
        ));
    }
}
