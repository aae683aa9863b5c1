use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime environment; development exposes error detail in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Redis connection string. `None` keeps rate-limit counters in process.
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u64,
    pub api_prefix: String,
    pub environment: Environment,
    /// Credentials of an admin account created at startup if it does not exist yet.
    pub admin_seed: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        let jwt_refresh_secret = optional("JWT_REFRESH_SECRET").unwrap_or_else(|| jwt_secret.clone());

        let environment = match optional("APP_ENV").as_deref() {
            None | Some("production") => Environment::Production,
            Some("development") => Environment::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "APP_ENV",
                    value: other.to_string(),
                })
            }
        };

        let admin_seed = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: parse_or("SERVER_PORT", 8080)?,
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            jwt_secret,
            jwt_refresh_secret,
            access_token_ttl: Duration::from_secs(60 * parse_or("ACCESS_TOKEN_TTL_MINUTES", 15u64)?),
            refresh_token_ttl: Duration::from_secs(
                24 * 60 * 60 * parse_or("REFRESH_TOKEN_TTL_DAYS", 7u64)?,
            ),
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            rate_limit_window: Duration::from_secs(parse_or("RATE_LIMIT_WINDOW_SECS", 15 * 60u64)?),
            rate_limit_max: parse_or("RATE_LIMIT_MAX", 100u64)?,
            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string()),
            environment,
            admin_seed,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
