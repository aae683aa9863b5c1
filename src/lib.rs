#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "Task management REST API: JWT authentication, role and ownership checks,"]
#![doc = "declarative request validation, best-effort audit logging and per-client"]
#![doc = "rate limiting. The binary (`main.rs`) wires these into an `HttpServer`."]

pub mod audit;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod ownership;
pub mod ratelimit;
pub mod response;
pub mod routes;
pub mod security;
pub mod state;
pub mod store;
pub mod validation;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
