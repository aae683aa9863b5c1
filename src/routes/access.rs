//! Role-gated routes: one per role policy, useful for checking a token's role.

use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

use crate::auth::{AdminOnly, Authorized, Identity};

#[get("/admin-only")]
pub async fn admin_only(auth: Authorized<AdminOnly>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": format!("Welcome, admin {}!", auth.identity.user_id)
    }))
}

/// Any authenticated user, admins included.
#[get("/user-only")]
pub async fn user_only(identity: Identity) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": format!("Welcome, user {}!", identity.user_id)
    }))
}
