//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every handler, extractor and middleware surfaces its failures as an `AppError`, and
//! the single `ResponseError` implementation below is the terminal boundary that turns
//! them into the JSON error envelope `{ success: false, message, ... }`.
//!
//! `From` implementations for `sqlx::Error`, `jsonwebtoken::errors::Error`,
//! `bcrypt::BcryptError` and `StoreError` allow propagation with the `?` operator.
//! Internal (500-class) details are hidden from clients. In development the
//! [`development_details`] middleware rewrites error envelopes to carry the real
//! message and a `stack` field.

use actix_web::{
    body::EitherBody,
    dev::ServiceResponse,
    error::ResponseError,
    http::{header, StatusCode},
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Name of the body field or path parameter the rule applies to.
    pub field: String,
    /// Message attached to the failed check.
    pub message: String,
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant maps to one HTTP status code in [`ResponseError::status_code`].
#[derive(Debug)]
pub enum AppError {
    /// One or more declarative validation rules failed (HTTP 400).
    Validation(Vec<FieldViolation>),
    /// Malformed request or a domain rule such as a duplicate email (HTTP 400).
    BadRequest(String),
    /// Missing, malformed, expired or badly signed token, or bad credentials (HTTP 401).
    Unauthorized(String),
    /// Role or ownership mismatch (HTTP 403).
    Forbidden(String),
    /// Requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Client exceeded its request budget for the current window (HTTP 429).
    RateLimited {
        /// Seconds until the window resets.
        retry_after: u64,
    },
    /// Represents an error originating from the storage backend (HTTP 500).
    DatabaseError(String),
    /// Catch-all for unexpected failures (HTTP 500).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(violations) => {
                write!(f, "Validation failed: {} violation(s)", violations.len())
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::RateLimited { retry_after } => {
                write!(f, "Rate limit exceeded, retry after {}s", retry_after)
            }
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// The message placed in the `message` field of the error envelope.
    /// Internal messages are only revealed when `detailed` is set.
    fn client_message(&self, detailed: bool) -> String {
        match self {
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::RateLimited { .. } => RATE_LIMIT_MESSAGE.to_string(),
            AppError::DatabaseError(msg) | AppError::InternalServerError(msg) => {
                if detailed {
                    msg.clone()
                } else {
                    "Internal Server Error".to_string()
                }
            }
        }
    }

    /// The JSON error envelope. `detailed` adds `stack` and internal messages.
    fn envelope(&self, detailed: bool) -> serde_json::Value {
        let mut body = json!({
            "success": false,
            "message": self.client_message(detailed),
        });
        if let AppError::Validation(violations) = self {
            body["errors"] = json!(violations);
        }
        if detailed {
            body["stack"] = json!(format!("{:?}", self));
        }
        body
    }
}

/// Plain-text body sent with every 429 response.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, try again later.";

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// This is the one place where domain errors become the client-facing envelope.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if let AppError::RateLimited { retry_after } = self {
            return HttpResponse::build(status)
                .insert_header((header::RETRY_AFTER, retry_after.to_string()))
                .content_type("text/plain; charset=utf-8")
                .body(RATE_LIMIT_MESSAGE);
        }

        if status.is_server_error() {
            log::error!("{}", self);
        }

        HttpResponse::build(status).json(self.envelope(false))
    }
}

/// Error handler middleware for development deployments.
///
/// Rebuilds the envelope of every `AppError` response with the real message and a
/// `stack` field. Plain-text 429 responses and errors raised outside the
/// application pass through untouched. Mount it behind
/// `middleware::Condition` so production builds skip it.
pub fn development_details<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().default_handler(add_development_details)
}

fn add_development_details<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let detailed = match res.response().error().and_then(|e| e.as_error::<AppError>()) {
        None | Some(AppError::RateLimited { .. }) => None,
        Some(error) => Some(error.envelope(true)),
    };
    let Some(body) = detailed else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let (req, res) = res.into_parts();
    let res = res.set_body(body.to_string());
    let res: ServiceResponse<EitherBody<B>> = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`, everything else to
/// `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::Conflict(msg) => AppError::BadRequest(msg),
            StoreError::Backend(msg) => AppError::DatabaseError(msg),
        }
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
