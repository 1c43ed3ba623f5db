use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::limiter::RateLimiter;
use crate::storage::SessionStore;

/// Periodic maintenance: evicts idle sessions and compacts the rate limiter
/// maps. Correctness never depends on it running; expiry and window checks
/// are enforced lazily on access.
pub struct Reaper {
    sessions: Arc<SessionStore>,
    turn_limiter: Arc<RateLimiter>,
    ingest_limiter: Arc<RateLimiter>,
}

impl Reaper {
    pub fn new(
        sessions: Arc<SessionStore>,
        turn_limiter: Arc<RateLimiter>,
        ingest_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            sessions,
            turn_limiter,
            ingest_limiter,
        }
    }

    /// One sweep. Returns the number of sessions evicted.
    pub async fn run(&self, now: DateTime<Utc>) -> usize {
        let evicted = self.sessions.evict_expired(now).await;
        self.turn_limiter.cleanup(now).await;
        self.ingest_limiter.cleanup(now).await;
        if evicted > 0 {
            tracing::info!("Evicted {} expired session(s)", evicted);
        }
        evicted
    }

    /// Sweeps forever on a fixed interval. Spawn this on the runtime.
    pub async fn run_periodically(self, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        // tokio intervals fire immediately; skip the startup tick.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.run(Utc::now()).await;
        }
    }
}
