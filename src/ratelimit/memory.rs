use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{RateLimitStore, WindowHit};
use crate::store::StoreError;

/// Expired windows are swept once the map grows past this many keys.
const SWEEP_THRESHOLD: usize = 1024;

struct Window {
    count: u64,
    resets_at: Instant,
}

/// In-process counters. Not shared across instances and lost on restart.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, StoreError> {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| StoreError::Backend("rate limit lock poisoned".into()))?;

        if windows.len() >= SWEEP_THRESHOLD && !windows.contains_key(key) {
            windows.retain(|_, w| w.resets_at > now);
        }

        let entry = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            resets_at: now + window,
        });
        if entry.resets_at <= now {
            entry.count = 0;
            entry.resets_at = now + window;
        }
        entry.count += 1;

        Ok(WindowHit {
            count: entry.count,
            reset_after: entry.resets_at.saturating_duration_since(now),
        })
    }

    fn backend(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_counts_within_window() {
        let store = MemoryRateLimitStore::new();
        let window = Duration::from_secs(900);

        let first = store.hit("k", window).await.unwrap();
        let second = store.hit("k", window).await.unwrap();

        assert_eq!(first.count, 1);
        assert_eq!(second.count, 2);
        assert!(second.reset_after <= window);
    }

    #[actix_rt::test]
    async fn test_sweeps_expired_windows() {
        let store = MemoryRateLimitStore::new();
        for i in 0..SWEEP_THRESHOLD {
            store
                .hit(&format!("old-{}", i), Duration::from_millis(1))
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;

        store.hit("fresh", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.windows.lock().unwrap().len(), 1);
    }
}
