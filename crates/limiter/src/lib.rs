//! Per-host token-bucket rate limiting.
//!
//! Mirrors the shape of a frontier keyed by host: a concurrent map from host
//! string to its own limiter, created lazily and race-free on first use.

use std::num::NonZeroU32;
use std::sync::Arc;

use dashmap::DashMap;
use governor::{Quota, RateLimiter};
use tracing::debug;
use url::Url;

type HostLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Concurrent mapping from host to a token-bucket limiter, with lazy
/// load-or-create semantics: if two tasks race to create a limiter for the
/// same host, only one limiter wins and both tasks use it.
pub struct DomainLimiter {
    buckets: DashMap<String, Arc<HostLimiter>>,
    default_rps: u32,
    burst: u32,
}

impl DomainLimiter {
    pub fn new(default_rps: u32, burst: u32) -> Self {
        Self {
            buckets: DashMap::new(),
            default_rps: if default_rps == 0 { 2 } else { default_rps },
            burst: if burst == 0 { 5 } else { burst },
        }
    }

    fn quota(&self) -> Quota {
        let rps = NonZeroU32::new(self.default_rps).expect("clamped to nonzero in new()");
        let burst = NonZeroU32::new(self.burst).expect("clamped to nonzero in new()");
        Quota::per_second(rps).allow_burst(burst)
    }

    fn get_or_create(&self, host: &str) -> Arc<HostLimiter> {
        if let Some(existing) = self.buckets.get(host) {
            return existing.clone();
        }
        // Race-free: DashMap's entry API takes the shard lock, so a
        // concurrent creator for the same key always observes (and reuses)
        // whichever limiter won the race.
        self.buckets
            .entry(host.to_string())
            .or_insert_with(|| {
                debug!(host, "creating rate limiter bucket");
                Arc::new(RateLimiter::direct(self.quota()))
            })
            .clone()
    }

    /// Non-blocking: consumes one token for `host` if available.
    pub fn allow(&self, host: &str) -> bool {
        self.get_or_create(host).check().is_ok()
    }

    /// Derive the rate-limiter key from a URL's authority; on parse failure,
    /// degrade gracefully to per-URL limiting by keying on the raw string.
    pub fn host_key(url_str: &str) -> String {
        match Url::parse(url_str) {
            Ok(url) => url.host_str().unwrap_or(url_str).to_string(),
            Err(_) => url_str.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_invalid_config() {
        let limiter = DomainLimiter::new(0, 0);
        assert_eq!(limiter.default_rps, 2);
        assert_eq!(limiter.burst, 5);
    }

    #[test]
    fn burst_then_denies() {
        let limiter = DomainLimiter::new(1, 3);
        // burst of 3: first 3 calls succeed immediately, 4th is denied.
        assert!(limiter.allow("example.com"));
        assert!(limiter.allow("example.com"));
        assert!(limiter.allow("example.com"));
        assert!(!limiter.allow("example.com"));
    }

    #[test]
    fn hosts_are_independent() {
        let limiter = DomainLimiter::new(1, 1);
        assert!(limiter.allow("a.example"));
        assert!(!limiter.allow("a.example"));
        // a different host has its own bucket, unaffected by a.example's exhaustion.
        assert!(limiter.allow("b.example"));
    }

    #[test]
    fn host_key_falls_back_to_raw_string() {
        assert_eq!(DomainLimiter::host_key("https://example.com/a"), "example.com");
        assert_eq!(DomainLimiter::host_key("not a url"), "not a url");
    }
}
