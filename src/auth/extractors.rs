use actix_web::dev::Payload;
use actix_web::{http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Role;
use crate::state::AppState;

/// The authenticated caller, decoded from the `Authorization: Bearer` header.
///
/// Handlers take `Identity` as an argument instead of reading ambient request
/// state. Extraction fails with `AppError::Unauthorized` (401) when the header is
/// missing or malformed, or the token is expired, badly signed or not an access
/// token. It has no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn authenticate(req: &HttpRequest) -> Result<Self, AppError> {
        let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
            AppError::InternalServerError("AppState is not registered on the app".into())
        })?;
        let token = bearer_token(req)?;
        let claims = state.tokens.verify_access(token)?;

        Ok(Identity {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Malformed authorization header".into()))
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Identity::authenticate(req))
    }
}

/// Address of the directly connected peer, used for audit entries and as the
/// rate-limit key. `None` when the transport does not expose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    pub fn of(req: &HttpRequest) -> Self {
        ClientIp(req.peer_addr().map(|addr| addr.ip().to_string()))
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl FromRequest for ClientIp {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(ClientIp::of(req)))
    }
}
