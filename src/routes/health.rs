use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::state::AppState;

/// Health check endpoint
///
/// Unauthenticated liveness check. Also reports which rate-limit backend is active.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "message": "TaskHub API running",
        "rateLimiter": state.rate_limiter.backend()
    }))
}
