use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Script;

use super::{RateLimitStore, WindowHit};
use crate::store::StoreError;

const KEY_PREFIX: &str = "rl:";

// INCR, set the expiry on the first hit of a window, report the remaining TTL.
const HIT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('PTTL', KEYS[1])
if ttl < 0 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
    ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// Counters shared by every instance pointed at the same Redis.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    conn: ConnectionManager,
    script: Script,
}

impl From<redis::RedisError> for StoreError {
    fn from(error: redis::RedisError) -> Self {
        StoreError::Backend(format!("redis: {}", error))
    }
}

impl RedisRateLimitStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            script: Script::new(HIT_SCRIPT),
        })
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, StoreError> {
        let mut conn = self.conn.clone();
        let (count, ttl_ms): (i64, i64) = self
            .script
            .key(format!("{}{}", KEY_PREFIX, key))
            .arg(window.as_millis() as u64)
            .invoke_async(&mut conn)
            .await?;

        Ok(WindowHit {
            count: count.max(0) as u64,
            reset_after: Duration::from_millis(ttl_ms.max(0) as u64),
        })
    }

    fn backend(&self) -> &'static str {
        "Redis"
    }
}
