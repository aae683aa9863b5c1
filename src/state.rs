use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::auth::{hash_password, TokenIssuer};
use crate::config::Config;
use crate::error::AppError;
use crate::models::{NewUser, Role};
use crate::ratelimit::{MemoryRateLimitStore, RateLimitStore, RateLimiter, RedisRateLimitStore};
use crate::store::{AuditStore, MemoryStore, PgStore, StoreError, TaskStore, UserStore};

/// Everything handlers need, shared across workers through `web::Data<AppState>`.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub audit: AuditLogger,
    pub tokens: TokenIssuer,
    pub rate_limiter: RateLimiter,
    pub bcrypt_cost: u32,
}

impl AppState {
    /// Wires every store seam to the same backend.
    pub fn new<S>(store: Arc<S>, tokens: TokenIssuer, rate_limiter: RateLimiter, bcrypt_cost: u32) -> Self
    where
        S: UserStore + TaskStore + AuditStore + 'static,
    {
        let audit_store: Arc<dyn AuditStore> = store.clone();
        Self {
            users: store.clone(),
            tasks: store,
            audit: AuditLogger::new(audit_store),
            tokens,
            rate_limiter,
            bcrypt_cost,
        }
    }

    /// Picks Postgres when `DATABASE_URL` is set and Redis when `REDIS_URL` is set,
    /// in-memory backends otherwise.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let limiter_store: Arc<dyn RateLimitStore> = match &config.redis_url {
            Some(url) => {
                log::info!("Using Redis rate limiter");
                Arc::new(RedisRateLimitStore::connect(url).await?)
            }
            None => {
                log::info!("Using in-memory rate limiter");
                Arc::new(MemoryRateLimitStore::new())
            }
        };
        let rate_limiter =
            RateLimiter::new(limiter_store, config.rate_limit_max, config.rate_limit_window);
        let tokens = TokenIssuer::from_config(config);

        let state = match &config.database_url {
            Some(url) => {
                log::info!("Connecting to Postgres");
                let store = Arc::new(PgStore::connect(url).await?);
                Self::new(store, tokens, rate_limiter, config.bcrypt_cost)
            }
            None => {
                log::warn!("DATABASE_URL not set, data is kept in memory only");
                Self::new(Arc::new(MemoryStore::new()), tokens, rate_limiter, config.bcrypt_cost)
            }
        };
        Ok(state)
    }

    /// Creates an admin account unless the email is already registered.
    /// An existing account is left untouched, including its role.
    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        let email = crate::auth::normalize_email(email);
        if self.users.find_user_by_email(&email).await?.is_some() {
            log::info!("Admin seed skipped, {} already exists", email);
            return Ok(());
        }

        let user = self
            .users
            .create_user(NewUser {
                name: "Administrator".to_string(),
                email,
                password_hash: hash_password(password, self.bcrypt_cost)?,
                role: Role::Admin,
            })
            .await?;
        log::info!("Seeded admin user {}", user.id);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn in_memory_for_tests() -> Self {
        Self::for_tests(Arc::new(MemoryStore::new()))
    }

    #[cfg(test)]
    pub(crate) fn for_tests<S>(store: Arc<S>) -> Self
    where
        S: UserStore + TaskStore + AuditStore + 'static,
    {
        use std::time::Duration;

        let tokens = TokenIssuer::new(
            "unit-test-access",
            "unit-test-refresh",
            Duration::from_secs(15 * 60),
            Duration::from_secs(7 * 24 * 60 * 60),
        );
        let limiter = RateLimiter::new(
            Arc::new(MemoryRateLimitStore::new()),
            100,
            Duration::from_secs(15 * 60),
        );
        Self::new(store, tokens, limiter, 4)
    }
}
