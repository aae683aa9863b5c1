mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use taskhub::models::AuditAction;

use common::{
    bearer, init_app, init_app_with, login, peer, register, test_state, wait_for_audit, API_PREFIX,
};

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let state = test_state();
    let app = init_app(state.clone()).await;

    let req = test::TestRequest::post()
        .uri(&format!("{}/auth/register", API_PREFIX))
        .set_json(json!({ "name": "A", "email": "a@x.com", "password": "Secret123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User registered successfully");

    let (status, body) = login(&app, "a@x.com", "Secret123").await;
    assert_eq!(status, 200);
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert!(!body["refreshToken"].as_str().unwrap().is_empty());

    let registered = wait_for_audit(&state, AuditAction::UserRegister, 1).await;
    let logins = wait_for_audit(&state, AuditAction::UserLogin, 1).await;
    assert_eq!(registered.len(), 1);
    assert_eq!(logins.len(), 1);
    assert_eq!(registered[0].actor, logins[0].actor);
    assert_eq!(logins[0].ip_address.as_deref(), Some("10.0.0.1"));
}

#[actix_rt::test]
async fn test_duplicate_email_is_rejected_without_creating_a_user() {
    let state = test_state();
    let app = init_app(state.clone()).await;

    assert_eq!(register(&app, "A", "a@x.com", "Secret123").await, 201);

    let req = test::TestRequest::post()
        .uri(&format!("{}/auth/register", API_PREFIX))
        .set_json(json!({ "name": "B", "email": "A@X.com", "password": "Other123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User already exists");

    assert_eq!(state.users.count_users().await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_failed_logins_are_audited_once_each() {
    let state = test_state();
    let app = init_app(state.clone()).await;
    assert_eq!(register(&app, "A", "a@x.com", "Secret123").await, 201);

    let (status, body) = login(&app, "a@x.com", "wrong-password").await;
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Invalid credentials");

    let failed = wait_for_audit(&state, AuditAction::LoginFailed, 1).await;
    assert_eq!(failed.len(), 1);
    assert!(failed[0].actor.is_some());

    let (status, body) = login(&app, "nobody@x.com", "Secret123").await;
    assert_eq!(status, 401);
    assert_eq!(body["message"], "Invalid credentials");

    let failed = wait_for_audit(&state, AuditAction::LoginFailed, 2).await;
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[1].actor, None);

    // No stray entries arrive later.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(wait_for_audit(&state, AuditAction::LoginFailed, 2).await.len(), 2);
    assert!(wait_for_audit(&state, AuditAction::UserLogin, 0).await.is_empty());
}

#[actix_rt::test]
async fn test_refresh_issues_new_access_token() {
    let app = init_app(test_state()).await;
    assert_eq!(register(&app, "A", "a@x.com", "Secret123").await, 201);
    let (_, tokens) = login(&app, "a@x.com", "Secret123").await;

    let req = test::TestRequest::post()
        .uri(&format!("{}/auth/refresh", API_PREFIX))
        .set_json(json!({ "refreshToken": tokens["refreshToken"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let access = body["accessToken"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("{}/user-only", API_PREFIX))
        .insert_header(bearer(access))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // A refresh token is not accepted as an access token.
    let req = test::TestRequest::get()
        .uri(&format!("{}/user-only", API_PREFIX))
        .insert_header(bearer(tokens["refreshToken"].as_str().unwrap()))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_rt::test]
async fn test_role_gated_routes() {
    let state = test_state();
    state.seed_admin("root@x.com", "rootpass").await.unwrap();
    let app = init_app(state.clone()).await;

    let (_, admin) = login(&app, "root@x.com", "rootpass").await;
    let admin_token = admin["accessToken"].as_str().unwrap().to_string();
    let user_token = common::access_token(&app, "U", "u@x.com").await;

    let req = test::TestRequest::get()
        .uri(&format!("{}/admin-only", API_PREFIX))
        .insert_header(bearer(&admin_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].as_str().unwrap().starts_with("Welcome, admin "));

    let req = test::TestRequest::get()
        .uri(&format!("{}/admin-only", API_PREFIX))
        .insert_header(bearer(&user_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_rt::test]
async fn test_unknown_route_uses_error_envelope() {
    let app = init_app(test_state()).await;
    let req = test::TestRequest::get()
        .uri("/nope")
        .peer_addr(peer(9))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
}

#[actix_rt::test]
async fn test_unknown_route_carries_security_headers() {
    let app = init_app(test_state()).await;
    let req = test::TestRequest::get()
        .uri("/nope")
        .peer_addr(peer(9))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(resp.headers().get("X-Frame-Options").unwrap(), "DENY");
}

#[actix_rt::test]
async fn test_development_mode_adds_stack_to_errors() {
    let dev = init_app_with(test_state(), true).await;
    let resp = test::call_service(&dev, test::TestRequest::get().uri("/tasks").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Missing token");
    assert!(body["stack"].as_str().unwrap().contains("Unauthorized"));

    let prod = init_app(test_state()).await;
    let resp = test::call_service(&prod, test::TestRequest::get().uri("/tasks").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("stack").is_none());
}
