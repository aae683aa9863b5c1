#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    middleware::Condition,
    test, web, App,
};
use serde_json::{json, Value};
use taskhub::{
    auth::TokenIssuer,
    models::{AuditAction, AuditLogEntry},
    ratelimit::{MemoryRateLimitStore, RateLimit, RateLimiter},
    error::development_details,
    routes,
    security::security_headers,
    store::MemoryStore,
    AppState,
};

pub const API_PREFIX: &str = "/api/v1";

/// In-memory state with a cheap bcrypt cost and the default 100 requests per 15 minutes.
pub fn test_state() -> web::Data<AppState> {
    test_state_with_limit(100)
}

pub fn test_state_with_limit(max_requests: u64) -> web::Data<AppState> {
    let tokens = TokenIssuer::new(
        "integration-access-secret",
        "integration-refresh-secret",
        Duration::from_secs(15 * 60),
        Duration::from_secs(7 * 24 * 60 * 60),
    );
    let limiter = RateLimiter::new(
        Arc::new(MemoryRateLimitStore::new()),
        max_requests,
        Duration::from_secs(15 * 60),
    );
    web::Data::new(AppState::new(Arc::new(MemoryStore::new()), tokens, limiter, 4))
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    init_app_with(state, false).await
}

/// Same middleware stack as the server binary; `development` enables error details.
pub async fn init_app_with(
    state: web::Data<AppState>,
    development: bool,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state.clone())
            .wrap(Condition::new(development, development_details()))
            .wrap(RateLimit::new(state.rate_limiter.clone()))
            .wrap(security_headers(!development))
            .configure(|cfg| routes::configure(cfg, API_PREFIX))
            .default_service(web::to(routes::not_found)),
    )
    .await
}

/// Distinct peer address per test client so the rate limiter sees separate callers.
pub fn peer(n: u8) -> SocketAddr {
    SocketAddr::from(([10, 0, 0, n], 40000))
}

pub async fn register<S, B>(app: &S, name: &str, email: &str, password: &str) -> u16
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("{}/auth/register", API_PREFIX))
        .peer_addr(peer(1))
        .set_json(json!({ "name": name, "email": email, "password": password }))
        .to_request();
    test::call_service(app, req).await.status().as_u16()
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> (u16, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri(&format!("{}/auth/login", API_PREFIX))
        .peer_addr(peer(1))
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// Registers and logs in, returning the access token.
pub async fn access_token<S, B>(app: &S, name: &str, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    assert_eq!(register(app, name, email, "Secret123").await, 201);
    let (status, body) = login(app, email, "Secret123").await;
    assert_eq!(status, 200, "login failed: {}", body);
    body["accessToken"]
        .as_str()
        .expect("accessToken missing")
        .to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Polls the audit trail until `expected` entries with `action` exist or a timeout passes.
/// Audit writes are detached from the response, so they may land slightly later.
pub async fn wait_for_audit(
    state: &AppState,
    action: AuditAction,
    expected: usize,
) -> Vec<AuditLogEntry> {
    let mut matching = Vec::new();
    for _ in 0..50 {
        matching = state
            .audit
            .entries()
            .await
            .unwrap()
            .into_iter()
            .filter(|e| e.action == action)
            .collect();
        if matching.len() >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    matching
}
