//! Per-client request rate limiting
//!
//! Fixed-window counting: the window resets once its age exceeds the
//! configured span, and a request is allowed while the incremented count
//! stays at or below the maximum. In-memory and single-instance by design;
//! best-effort under concurrent requests for the same client.

use std::time::Duration;
use std::time::Instant;

use dashmap::DashMap;

use crate::config::RateLimitConfig;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    window_start: Instant,
    count: u32,
}

/// In-memory fixed-window rate limiter service.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    entries: DashMap<String, WindowEntry>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            entries: DashMap::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Duration::from_millis(config.window_ms),
            config.max_requests,
        )
    }

    /// Record one request for `client` and report whether it is allowed.
    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }

    fn allow_at(&self, client: &str, now: Instant) -> bool {
        let mut entry = self
            .entries
            .entry(client.to_string())
            .or_insert(WindowEntry {
                window_start: now,
                count: 0,
            });
        if now.duration_since(entry.window_start) > self.window {
            entry.window_start = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= self.max_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Duration::from_secs(15), 5)
    }

    #[test]
    fn sixth_request_in_window_is_rejected() {
        let limiter = limiter();
        let start = Instant::now();
        for _ in 0..5 {
            assert!(limiter.allow_at("1.2.3.4", start));
        }
        assert!(!limiter.allow_at("1.2.3.4", start + Duration::from_secs(5)));
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = limiter();
        let start = Instant::now();
        for _ in 0..6 {
            let _ = limiter.allow_at("1.2.3.4", start);
        }
        assert!(limiter.allow_at("1.2.3.4", start + Duration::from_secs(16)));
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = limiter();
        let start = Instant::now();
        for _ in 0..5 {
            assert!(limiter.allow_at("a", start));
        }
        assert!(!limiter.allow_at("a", start));
        assert!(limiter.allow_at("b", start));
    }
}
