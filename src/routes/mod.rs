pub mod access;
pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{web, HttpResponse};

use crate::error::AppError;

/// Registers every route. Auth and role-gated routes live under `api_prefix`; tasks and
/// health are mounted at the root.
pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    cfg.service(health::health)
        .service(
            web::scope(api_prefix)
                .service(
                    web::scope("/auth")
                        .service(auth::register)
                        .service(auth::login)
                        .service(auth::refresh),
                )
                .service(access::admin_only)
                .service(access::user_only),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// Fallback for unmatched routes, answered with the regular error envelope.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".into()))
}
