use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

// Idle keys are swept inline once every this many decisions
const SWEEP_EVERY: u64 = 1024;

/// Per-client admission check shared by all request handlers.
pub trait RateLimitStore: Send + Sync {
    /// Returns `true` and records the attempt when `key` is under its limit.
    /// A rejected attempt is not recorded.
    fn check_and_record(&self, key: &str) -> bool;
}

/// Sliding-window limiter keyed by client identifier.
///
/// Each key keeps the instants of its accepted requests, oldest first. Entries
/// older than the window are pruned before every decision, so the deque never
/// holds more than `max_per_window` instants.
pub struct SlidingWindowLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    max_per_window: usize,
    window: Duration,
    decisions: AtomicU64,
}

impl SlidingWindowLimiter {
    pub fn new(max_per_window: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_per_window,
            window,
            decisions: AtomicU64::new(0),
        }
    }

    /// Number of client keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    pub fn check_and_record_at(&self, key: &str, now: Instant) -> bool {
        let cutoff = now.checked_sub(self.window);

        // The entry guard holds the shard lock, so prune, count and push are
        // atomic for this key. It must be dropped before sweeping.
        let allowed = {
            let mut entry = self.windows.entry(key.to_string()).or_default();
            let timestamps = entry.value_mut();

            if let Some(cutoff) = cutoff {
                while timestamps.front().is_some_and(|t| *t < cutoff) {
                    timestamps.pop_front();
                }
            }

            if timestamps.len() >= self.max_per_window {
                false
            } else {
                timestamps.push_back(now);
                true
            }
        };

        if (self.decisions.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0 {
            self.sweep(now);
        }

        allowed
    }

    /// Drop keys with no timestamp left inside the window.
    pub fn sweep(&self, now: Instant) {
        let Some(cutoff) = now.checked_sub(self.window) else {
            return;
        };
        let before = self.windows.len();
        self.windows
            .retain(|_, timestamps| timestamps.back().is_some_and(|t| *t >= cutoff));
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, "swept idle rate limit keys");
        }
    }
}

impl RateLimitStore for SlidingWindowLimiter {
    fn check_and_record(&self, key: &str) -> bool {
        self.check_and_record_at(key, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter(max: usize, window_secs: u64) -> SlidingWindowLimiter {
        SlidingWindowLimiter::new(max, Duration::from_secs(window_secs))
    }

    #[test]
    fn accepts_up_to_max_then_rejects() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_and_record_at("1.2.3.4", now));
        }
        assert!(!limiter.check_and_record_at("1.2.3.4", now));
        assert!(!limiter.check_and_record_at("1.2.3.4", now + Duration::from_secs(59)));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_and_record_at("a", now));
        assert!(!limiter.check_and_record_at("a", now));
        assert!(limiter.check_and_record_at("b", now));
    }

    #[test]
    fn window_elapsing_past_oldest_readmits() {
        let limiter = limiter(2, 10);
        let start = Instant::now();

        assert!(limiter.check_and_record_at("k", start));
        assert!(limiter.check_and_record_at("k", start + Duration::from_secs(5)));
        assert!(!limiter.check_and_record_at("k", start + Duration::from_secs(6)));

        // first entry has aged out, the second still counts
        assert!(limiter.check_and_record_at("k", start + Duration::from_secs(11)));
        assert!(!limiter.check_and_record_at("k", start + Duration::from_secs(12)));
    }

    #[test]
    fn rejected_attempts_are_not_recorded() {
        let limiter = limiter(1, 10);
        let start = Instant::now();

        assert!(limiter.check_and_record_at("k", start));
        for s in 1..10 {
            assert!(!limiter.check_and_record_at("k", start + Duration::from_secs(s)));
        }
        // only the accepted call at `start` was kept
        assert!(limiter.check_and_record_at("k", start + Duration::from_secs(11)));
    }

    #[test]
    fn zero_max_rejects_everything() {
        let limiter = limiter(0, 60);
        assert!(!limiter.check_and_record("k"));
    }

    #[test]
    fn sweep_drops_idle_keys_only() {
        let limiter = limiter(5, 10);
        let start = Instant::now();

        limiter.check_and_record_at("old", start);
        limiter.check_and_record_at("fresh", start + Duration::from_secs(8));
        assert_eq!(limiter.tracked_keys(), 2);

        limiter.sweep(start + Duration::from_secs(15));
        assert_eq!(limiter.tracked_keys(), 1);
        assert!(limiter.windows.contains_key("fresh"));
    }

    #[test]
    fn concurrent_callers_on_one_key_never_exceed_max() {
        let limiter = Arc::new(limiter(50, 60));
        let accepted: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let limiter = Arc::clone(&limiter);
                    s.spawn(move || (0..20).filter(|_| limiter.check_and_record("shared")).count())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(accepted, 50);
    }
}
