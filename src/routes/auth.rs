use actix_web::{post, web, HttpResponse, Responder};

use crate::{
    auth::{
        hash_password, normalize_email, verify_password, AccessTokenResponse, ClientIp,
        LoginRequest, RefreshRequest, RegisterRequest,
    },
    error::AppError,
    models::{AuditAction, AuditLogEntry, NewUser, Role},
    response::MessageResponse,
    state::AppState,
    validation::Validated,
};

const AUTH_COLLECTION: &str = "auth";

/// Register a new user
///
/// Creates an account with the `user` role. Responds 201 with a confirmation
/// message, or 400 if the email is already registered.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    ip: ClientIp,
    body: Validated<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let request = body.into_inner();
    let email = normalize_email(&request.email);

    if state.users.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest("User already exists".into()));
    }

    // A concurrent registration that wins the race surfaces as a store conflict,
    // which maps to the same 400.
    let user = state
        .users
        .create_user(NewUser {
            name: request.name.trim().to_string(),
            email,
            password_hash: hash_password(&request.password, state.bcrypt_cost)?,
            role: Role::User,
        })
        .await?;

    log::info!("Registered user {}", user.id);
    state.audit.record(
        AuditLogEntry::new(AuditAction::UserRegister, AUTH_COLLECTION)
            .actor(user.id)
            .document(user.id)
            .ip_address(ip.into_inner()),
    );

    Ok(HttpResponse::Created().json(MessageResponse::new("User registered successfully")))
}

/// Login user
///
/// Verifies the credentials and returns an access/refresh token pair. Every failed
/// attempt is audited as `LOGIN_FAILED` and answered with the same 401.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    ip: ClientIp,
    body: Validated<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let request = body.into_inner();
    let email = normalize_email(&request.email);
    let ip = ip.into_inner();

    let user = state.users.find_user_by_email(&email).await?;
    let user = match user {
        Some(user) if verify_password(&request.password, &user.password_hash)? => user,
        other => {
            let mut entry = AuditLogEntry::new(AuditAction::LoginFailed, AUTH_COLLECTION)
                .ip_address(ip);
            if let Some(user) = other {
                entry = entry.actor(user.id);
            }
            log::warn!("Failed login attempt for {}", email);
            state.audit.record(entry);
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
    };

    let tokens = state.tokens.issue(&user)?;
    state.audit.record(
        AuditLogEntry::new(AuditAction::UserLogin, AUTH_COLLECTION)
            .actor(user.id)
            .ip_address(ip),
    );

    Ok(HttpResponse::Ok().json(tokens))
}

/// Exchange a refresh token for a new access token.
///
/// The user is re-read so the new token carries the current role.
#[post("/refresh")]
pub async fn refresh(
    state: web::Data<AppState>,
    body: Validated<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    let claims = state.tokens.verify_refresh(&body.into_inner().refresh_token)?;

    let user = state
        .users
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    Ok(HttpResponse::Ok().json(AccessTokenResponse {
        access_token: state.tokens.issue_access(&user)?,
    }))
}
