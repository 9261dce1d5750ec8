//! Shared fixtures for the HTTP integration tests
//!
//! Each test builds the real application over a fresh in-memory store, so the
//! routing, guards and error mapping are the production ones.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{http::header::AUTHORIZATION, test::TestRequest, web};
use serde_json::{json, Value};

use vx_api::{AppState, InMemory};
use vx_core::entities::User;
use vx_core::repositories::UserRepository;
use vx_core::services::Authorizer;
use vx_infra::{LogOtpNotifier, MemoryStore};
use vx_shared::config::{AuthConfig, JwtConfig};

pub const PASSWORD: &str = "correct horse battery";

pub struct TestContext {
    pub store: MemoryStore,
    pub config: AuthConfig,
    pub state: web::Data<AppState<InMemory>>,
    pub authorizer: web::Data<dyn Authorizer>,
}

impl TestContext {
    pub fn new() -> Self {
        let mut config = AuthConfig::default();
        config.jwt = JwtConfig::new("integration-test-secret-key");
        config.password.bcrypt_cost = 4;

        let store = MemoryStore::new();
        let state = AppState::in_memory(store.clone(), Arc::new(LogOtpNotifier::new()), &config);
        let authorizer = web::Data::from(state.authorizer());

        Self {
            store,
            config,
            state: web::Data::new(state),
            authorizer,
        }
    }

    pub async fn user(&self, email: &str) -> User {
        self.store
            .find_by_email(email)
            .await
            .unwrap()
            .expect("user should exist")
    }

    /// The code currently pending for `email`, read straight from storage
    pub async fn pending_otp(&self, email: &str) -> Option<String> {
        self.user(email).await.otp
    }

    pub async fn promote(&self, email: &str) {
        let mut user = self.user(email).await;
        user.is_admin = true;
        self.store.update(user).await.unwrap();
    }
}

/// Build the application under test from a [`TestContext`]
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(vx_api::create_app(
            $ctx.state.clone(),
            $ctx.authorizer.clone(),
            vx_api::app::DEFAULT_MAX_PAYLOAD_SIZE,
        ))
        .await
    };
}

/// Send a `TestRequest` and return `(status, json body)`; non-JSON bodies read as `Null`
macro_rules! call {
    ($app:expr, $req:expr $(,)?) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = actix_web::test::read_body(resp).await;
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }};
}

pub fn post_json(uri: &str, body: Value) -> TestRequest {
    TestRequest::post().uri(uri).set_json(body)
}

pub fn bearer(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header((AUTHORIZATION, format!("Bearer {}", token)))
}

pub fn registration(email: &str) -> Value {
    json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "email": email,
        "password": PASSWORD,
    })
}

pub fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

pub fn access_token(body: &Value) -> String {
    body["userData"]["accessToken"].as_str().unwrap().to_string()
}

pub fn business_payload(name: &str, email: &str, phone: i64) -> Value {
    json!({
        "legalName": format!("{} Ltd", name),
        "displayName": name,
        "websiteLink": "https://example.com",
        "currency": "INR",
        "businessType": "retail",
        "businessGst": "27AAAAA0000A1Z5",
        "businessPan": "AAAAA0000A",
        "businessLogo": "https://example.com/logo.png",
        "contact": {
            "email": email,
            "phoneCode": 91,
            "phoneNumber": phone,
            "address": {
                "fullAddress": "1 Main Road",
                "district": "Central",
                "city": "Mumbai",
                "country": "India",
                "addressState": "Maharashtra",
                "postalCode": "400001",
                "directions": "Opposite the station"
            }
        }
    })
}
