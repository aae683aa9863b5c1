use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Role, User};

/// Distinguishes short-lived access tokens from refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: Uuid,
    /// Role of the user at issuance time.
    pub role: Role,
    pub typ: TokenKind,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

/// Tokens returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signs and verifies access and refresh tokens.
///
/// Access and refresh tokens use separate HMAC secrets and carry a `typ` claim, so
/// neither can stand in for the other. There is no revocation list: a token stays
/// valid until its `exp`.
pub struct TokenIssuer {
    access: SigningKeys,
    refresh: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: SigningKeys::from_secret(access_secret),
            refresh: SigningKeys::from_secret(refresh_secret),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_refresh_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    /// Issues an access/refresh pair for a user whose credentials were just verified.
    pub fn issue(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access(user)?,
            refresh_token: self.sign(user, TokenKind::Refresh)?,
        })
    }

    pub fn issue_access(&self, user: &User) -> Result<String, AppError> {
        self.sign(user, TokenKind::Access)
    }

    /// Verifies signature, expiry and token kind of an access token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        self.verify(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        self.verify(token, TokenKind::Refresh)
    }

    fn sign(&self, user: &User, typ: TokenKind) -> Result<String, AppError> {
        let (keys, ttl) = match typ {
            TokenKind::Access => (&self.access, self.access_ttl),
            TokenKind::Refresh => (&self.refresh, self.refresh_ttl),
        };
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user.id,
            role: user.role,
            typ,
            iat: now,
            exp: now + ttl.as_secs() as usize,
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AppError> {
        let keys = match expected {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        };
        let claims = decode::<Claims>(token, &keys.decoding, &Validation::default())?.claims;

        if claims.typ != expected {
            return Err(AppError::Unauthorized("Invalid token: wrong token type".into()));
        }
        Ok(claims)
    }
}
