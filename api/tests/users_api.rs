//! User administration routes and their guards

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test::TestRequest};
use serde_json::json;

use vx_core::repositories::UserRepository;

use common::*;

#[actix_web::test]
async fn test_list_users_requires_admin() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, member) = call!(
        app,
        post_json("/api/v1/auth/register", registration("member@example.com")),
    );
    let (_, admin) = call!(
        app,
        post_json("/api/v1/auth/register", registration("admin@example.com")),
    );
    ctx.promote("admin@example.com").await;

    let (status, _) = call!(app, TestRequest::get().uri("/api/v1/auth/users"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(
        app,
        bearer(TestRequest::get().uri("/api/v1/auth/users"), &access_token(&member))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized access");

    let (status, body) = call!(
        app,
        bearer(TestRequest::get().uri("/api/v1/auth/users"), &access_token(&admin))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 2);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_non_admin_delete_is_rejected_without_mutation() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, member) = call!(
        app,
        post_json("/api/v1/auth/register", registration("member@example.com")),
    );
    call!(app, post_json("/api/v1/auth/register", registration("victim@example.com")));
    let victim = ctx.user("victim@example.com").await;

    let uri = format!("/api/v1/auth/users/{}", victim.id);
    let (status, _) = call!(app, bearer(TestRequest::delete().uri(&uri), &access_token(&member)));

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(ctx.store.find_by_id(victim.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn test_admin_deletes_user() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, admin) = call!(
        app,
        post_json("/api/v1/auth/register", registration("admin@example.com")),
    );
    ctx.promote("admin@example.com").await;
    call!(app, post_json("/api/v1/auth/register", registration("gone@example.com")));
    let gone = ctx.user("gone@example.com").await;

    let uri = format!("/api/v1/auth/users/{}", gone.id);
    let (status, body) = call!(app, bearer(TestRequest::delete().uri(&uri), &access_token(&admin)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
    assert!(ctx.store.find_by_id(gone.id).await.unwrap().is_none());

    let (status, _) = call!(app, bearer(TestRequest::delete().uri(&uri), &access_token(&admin)));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_get_user_needs_authentication() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, member) = call!(
        app,
        post_json("/api/v1/auth/register", registration("member@example.com")),
    );
    let id = member["userData"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/auth/users/{}", id);

    let (status, _) = call!(app, TestRequest::get().uri(&uri));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(app, bearer(TestRequest::get().uri(&uri), &access_token(&member)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "member@example.com");
    assert!(body.get("accessToken").is_none());

    let missing = format!("/api/v1/auth/users/{}", uuid::Uuid::new_v4());
    let (status, body) = call!(
        app,
        bearer(TestRequest::get().uri(&missing), &access_token(&member)),
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, _) = call!(
        app,
        bearer(TestRequest::get().uri("/api/v1/auth/users/not-a-uuid"), &access_token(&member))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_update_self_or_as_admin() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, member) = call!(
        app,
        post_json("/api/v1/auth/register", registration("member@example.com")),
    );
    let (_, other) = call!(
        app,
        post_json("/api/v1/auth/register", registration("other@example.com")),
    );
    let member_uri = format!("/api/v1/auth/users/{}", member["userData"]["id"].as_str().unwrap());

    let update = TestRequest::put()
        .uri(&member_uri)
        .set_json(json!({"email": "Renamed@Example.com", "first_name": "Janet"}));
    let (status, body) = call!(app, bearer(update, &access_token(&member)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "renamed@example.com");
    assert_eq!(body["first_name"], "Janet");

    let hijack = TestRequest::put().uri(&member_uri).set_json(json!({"last_name": "X"}));
    let (status, _) = call!(app, bearer(hijack, &access_token(&other)));
    assert_eq!(status, StatusCode::FORBIDDEN);

    ctx.promote("other@example.com").await;
    let as_admin = TestRequest::put().uri(&member_uri).set_json(json!({"last_name": "Smith"}));
    let (status, body) = call!(app, bearer(as_admin, &access_token(&other)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["last_name"], "Smith");

    let taken = TestRequest::put().uri(&member_uri).set_json(json!({"email": "OTHER@example.com"}));
    let (status, _) = call!(app, bearer(taken, &access_token(&member)));
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_make_admin() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, admin) = call!(
        app,
        post_json("/api/v1/auth/register", registration("admin@example.com")),
    );
    let (_, member) = call!(
        app,
        post_json("/api/v1/auth/register", registration("member@example.com")),
    );
    ctx.promote("admin@example.com").await;
    let uri = format!("/api/v1/auth/users/{}/admin", member["userData"]["id"].as_str().unwrap());

    let (status, _) = call!(app, bearer(TestRequest::patch().uri(&uri), &access_token(&member)));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!ctx.user("member@example.com").await.is_admin);

    let (status, body) = call!(app, bearer(TestRequest::patch().uri(&uri), &access_token(&admin)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], true);
}

#[actix_web::test]
async fn test_delete_profile_is_admin_only() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);
    let (_, member) = call!(
        app,
        post_json("/api/v1/auth/register", registration("member@example.com")),
    );
    let (_, admin) = call!(
        app,
        post_json("/api/v1/auth/register", registration("admin@example.com")),
    );
    ctx.promote("admin@example.com").await;

    let (status, _) = call!(
        app,
        bearer(TestRequest::delete().uri("/api/v1/auth/profile"), &access_token(&member))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(
        app,
        bearer(TestRequest::delete().uri("/api/v1/auth/profile"), &access_token(&admin))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile deleted successfully");
    assert!(ctx
        .store
        .find_by_email("admin@example.com")
        .await
        .unwrap()
        .is_none());
}
