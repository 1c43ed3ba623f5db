use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct WindowEntry {
    count: u32,
    window_reset_at: DateTime<Utc>,
}

/// Fixed-window rate limiter keyed by caller identity.
///
/// Counting restarts from scratch whenever a window elapses; a burst that
/// straddles two windows can briefly exceed the nominal rate. That is the
/// accepted trade-off of the fixed-window scheme.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: RwLock<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Records one request for `key` and reports whether it is allowed.
    /// The clock is passed in so callers and tests control time.
    pub async fn check(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) if now <= entry.window_reset_at => {
                entry.count += 1;
                entry.count <= self.max_requests
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    WindowEntry {
                        count: 1,
                        window_reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    /// Drops entries whose window has elapsed. Denial decisions never depend
    /// on this; it only keeps the map from growing unboundedly.
    pub async fn cleanup(&self, now: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| now <= entry.window_reset_at);
    }

    pub async fn tracked_keys(&self) -> usize {
        self.entries.read().await.len()
    }
}
