//! Fixed-window request counters keyed by client identity.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Prune elapsed windows once the table holds this many keys, at most once per window.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct Table {
    windows: HashMap<String, Window>,
    next_prune: Instant,
}

/// At most `max_requests` per key per `window`. Counters reset when the window elapses.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    table: Mutex<Table>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            table: Mutex::new(Table {
                windows: HashMap::new(),
                next_prune: Instant::now(),
            }),
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut table = match self.table.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if table.windows.len() >= PRUNE_THRESHOLD && now >= table.next_prune {
            let window = self.window;
            table
                .windows
                .retain(|_, w| now.duration_since(w.started) < window);
            table.next_prune = now + window;
        }

        let entry = table.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let elapsed = now.duration_since(entry.started);
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }
        entry.count += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - entry.count,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        match self.table.lock() {
            Ok(guard) => guard.windows.len(),
            Err(poisoned) => poisoned.into_inner().windows.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn hundred_and_first_request_is_limited() {
        let limiter = RateLimiter::new(100, Duration::from_secs(60));
        let start = Instant::now();
        for i in 0..100 {
            let at = start + Duration::from_millis(i * 10);
            assert!(matches!(
                limiter.check_at("10.0.0.1", at),
                RateDecision::Allowed { .. }
            ));
        }
        match limiter.check_at("10.0.0.1", start + Duration::from_secs(30)) {
            RateDecision::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(30))
            }
            other => panic!("expected limit, got {:?}", other),
        }
    }

    #[test]
    fn window_rollover_resets_counter() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        limiter.check_at("c", start);
        limiter.check_at("c", start);
        assert!(matches!(limiter.check_at("c", start), RateDecision::Limited { .. }));
        assert_eq!(
            limiter.check_at("c", start + Duration::from_secs(60)),
            RateDecision::Allowed { remaining: 1 }
        );
    }

    #[test]
    fn keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(matches!(limiter.check_at("a", now), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at("b", now), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check_at("a", now), RateDecision::Limited { .. }));
    }

    #[test]
    fn elapsed_windows_are_pruned() {
        let limiter = RateLimiter::new(5, Duration::from_secs(1));
        let start = Instant::now();
        for i in 0..PRUNE_THRESHOLD {
            limiter.check_at(&format!("client-{}", i), start);
        }
        assert_eq!(limiter.tracked_keys(), PRUNE_THRESHOLD);
        limiter.check_at("late", start + Duration::from_secs(2));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn pruning_runs_at_most_once_per_window() {
        let limiter = RateLimiter::new(5, Duration::from_secs(1));
        let start = Instant::now();
        for i in 0..PRUNE_THRESHOLD {
            limiter.check_at(&format!("client-{}", i), start);
        }

        // Prunes, but nothing has elapsed yet.
        limiter.check_at("first", start + Duration::from_millis(500));
        assert_eq!(limiter.tracked_keys(), PRUNE_THRESHOLD + 1);

        // The bulk has elapsed, but the next prune is not due until 1.5s.
        limiter.check_at("second", start + Duration::from_millis(1200));
        assert_eq!(limiter.tracked_keys(), PRUNE_THRESHOLD + 2);

        limiter.check_at("third", start + Duration::from_millis(1600));
        assert_eq!(limiter.tracked_keys(), 2, "only `second` and `third` are live");
    }

    #[test]
    fn concurrent_checks_never_exceed_ceiling() {
        let limiter = Arc::new(RateLimiter::new(50, Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|_| matches!(limiter.check("shared"), RateDecision::Allowed { .. }))
                        .count()
                })
            })
            .collect();
        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }
}
