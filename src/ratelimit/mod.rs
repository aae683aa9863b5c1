//! Fixed-window rate limiting.
//!
//! [`RateLimiter`] counts requests per client key in windows of a fixed length and
//! is injected into the [`middleware::RateLimit`] middleware. The counters live behind
//! the [`RateLimitStore`] trait: [`MemoryRateLimitStore`] for a single instance,
//! [`RedisRateLimitStore`] when several instances must share one budget.

pub mod memory;
pub mod middleware;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::store::StoreError;

pub use self::memory::MemoryRateLimitStore;
pub use self::middleware::RateLimit;
pub use self::redis::RedisRateLimitStore;

/// Counter state after recording one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Hits in the current window, including this one.
    pub count: u64,
    /// Time left until the window resets.
    pub reset_after: Duration,
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records one hit for `key`, opening a new window of length `window` if the
    /// previous one has expired.
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, StoreError>;

    /// Backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Outcome of a rate-limit check, also used to fill the `RateLimit-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Seconds until reset, rounded up so a client never retries too early.
    pub fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, max_requests: u64, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    pub async fn check(&self, client: &str) -> Result<RateLimitDecision, StoreError> {
        let hit = self.store.hit(client, self.window).await?;
        Ok(RateLimitDecision {
            allowed: hit.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(hit.count),
            reset_after: hit.reset_after,
        })
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }
}
