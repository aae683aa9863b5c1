pub mod authorization;
pub mod extractors;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export necessary items
pub use authorization::{authorize, AdminOnly, Authorized, RolePolicy, UserOrAdmin};
pub use extractors::{ClientIp, Identity};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer, TokenKind, TokenPair};

/// Represents the payload for a new user registration request.
/// Field rules: `validation::rules::REGISTER_RULES`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address; unique across users.
    pub email: String,
    /// Plain-text password, at least 6 characters. Hashed before storage.
    pub password: String,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for exchanging a refresh token for a new access token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response structure after a token refresh.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
