use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use tracing::debug;

pub trait RateLimiter: Send + Sync {
    /// Whether a request for `key` may proceed now.
    fn allow(&self, key: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket per key. Each key starts with `burst` tokens and regains
/// `per_second` tokens every second up to `burst`.
#[derive(Debug, Clone)]
pub struct TokenBucketLimiter {
    per_second: f64,
    burst: f64,
    buckets: Arc<DashMap<String, Bucket>>,
}

impl TokenBucketLimiter {
    pub fn new(per_second: f64, burst: f64) -> Self {
        Self {
            per_second,
            burst: burst.max(1.0),
            buckets: Arc::new(DashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut bucket = self.buckets.entry(key.to_owned()).or_insert(Bucket {
            tokens: self.burst,
            last_refill: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.per_second).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens < 1.0 {
            return false;
        }

        bucket.tokens -= 1.0;
        true
    }

    /// Drops buckets untouched for longer than `idle`.
    pub fn evict_idle(&self, idle: Duration) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) < idle);

        before - self.buckets.len()
    }

    pub fn spawn_cleanup(&self, every: Duration) {
        let limiter = self.clone();
        let mut interval = tokio::time::interval(every);

        tokio::spawn(async move {
            loop {
                interval.tick().await;
                let removed = limiter.evict_idle(every);
                if removed > 0 {
                    debug!("Rate limiter evicted {} idle clients", removed);
                }
            }
        });
    }
}

impl RateLimiter for TokenBucketLimiter {
    fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }
}
