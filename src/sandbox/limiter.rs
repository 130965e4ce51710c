// limiter.rs - Fixed-window rate limiter keyed by client
//
// Timestamps are plain milliseconds supplied by the caller, so the same
// limiter runs server-side and in tests without a clock.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    pub window_ms: u64,
    pub max_requests: u32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self { window_ms: 60_000, max_requests: 5 }
    }
}

/// Outcome of one check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimit {
    pub allowed: bool,
    pub remaining: u32,
    /// Milliseconds until the window closes.
    pub reset_in_ms: u64,
}

impl RateLimit {
    /// Whole seconds until reset, rounded up, for headers and messages.
    pub fn reset_in_secs(&self) -> u64 {
        self.reset_in_ms.div_ceil(1000)
    }
}

#[derive(Clone, Copy, Debug)]
struct Window {
    count: u32,
    reset_at: u64,
}

#[derive(Debug, Default)]
pub struct RateLimiter {
    cfg: LimiterConfig,
    windows: HashMap<String, Window>,
}

impl RateLimiter {
    pub fn new(cfg: LimiterConfig) -> Self {
        Self { cfg, windows: HashMap::new() }
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.cfg
    }

    /// Number of clients currently tracked.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Count a request from `key` at `now_ms`.
    pub fn check(&mut self, key: &str, now_ms: u64) -> RateLimit {
        let max = self.cfg.max_requests;
        match self.windows.get_mut(key) {
            Some(w) if now_ms <= w.reset_at => {
                let reset_in_ms = w.reset_at - now_ms;
                if w.count >= max {
                    log::info!("rate limit: rejected {} for {} ms", key, reset_in_ms);
                    return RateLimit { allowed: false, remaining: 0, reset_in_ms };
                }
                w.count += 1;
                RateLimit { allowed: true, remaining: max - w.count, reset_in_ms }
            }
            _ => {
                // First request, or the old window ran out
                let reset_at = now_ms + self.cfg.window_ms;
                self.windows.insert(key.to_string(), Window { count: 1, reset_at });
                RateLimit {
                    allowed: true,
                    remaining: max.saturating_sub(1),
                    reset_in_ms: self.cfg.window_ms,
                }
            }
        }
    }

    /// Forget clients whose window has closed. Returns how many.
    pub fn purge_expired(&mut self, now_ms: u64) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, w| now_ms <= w.reset_at);
        let purged = before - self.windows.len();
        if purged > 0 {
            log::debug!("rate limit: purged {} expired windows", purged);
        }
        purged
    }
}

/// Client key from an `x-forwarded-for` header: first hop, trimmed.
pub fn client_key(forwarded_for: Option<&str>) -> &str {
    forwarded_for
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifth_request_is_last() {
        let mut rl = RateLimiter::new(LimiterConfig::default());
        for i in 0..5 {
            let r = rl.check("1.2.3.4", 1000 + i);
            assert!(r.allowed);
            assert_eq!(r.remaining, 4 - i as u32);
        }
        let r = rl.check("1.2.3.4", 11_000);
        assert!(!r.allowed);
        assert_eq!(r.remaining, 0);
        assert_eq!(r.reset_in_ms, 50_000);
        assert_eq!(r.reset_in_secs(), 50);
    }

    #[test]
    fn clients_are_independent() {
        let mut rl = RateLimiter::new(LimiterConfig { window_ms: 1000, max_requests: 1 });
        assert!(rl.check("a", 0).allowed);
        assert!(!rl.check("a", 10).allowed);
        assert!(rl.check("b", 10).allowed);
    }

    #[test]
    fn expired_window_starts_over() {
        let mut rl = RateLimiter::new(LimiterConfig { window_ms: 1000, max_requests: 1 });
        assert!(rl.check("a", 0).allowed);
        assert!(!rl.check("a", 1000).allowed);
        let r = rl.check("a", 1001);
        assert!(r.allowed);
        assert_eq!(r.reset_in_ms, 1000);
    }

    #[test]
    fn purge_drops_only_closed_windows() {
        let mut rl = RateLimiter::new(LimiterConfig { window_ms: 1000, max_requests: 5 });
        rl.check("old", 0);
        rl.check("new", 900);
        assert_eq!(rl.purge_expired(1500), 1);
        assert_eq!(rl.len(), 1);
    }

    #[test]
    fn rounds_reset_up_to_seconds() {
        let r = RateLimit { allowed: false, remaining: 0, reset_in_ms: 1001 };
        assert_eq!(r.reset_in_secs(), 2);
    }

    #[test]
    fn client_key_takes_first_hop() {
        assert_eq!(client_key(Some(" 10.0.0.1 , 172.16.0.1")), "10.0.0.1");
        assert_eq!(client_key(Some("")), "unknown");
        assert_eq!(client_key(None), "unknown");
    }
}
