//! Sliding-window request limiter

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Limit exceeded; retry after the given delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAfter(pub Duration);

/// Per-key hit queues plus the time of the last stale-key sweep
#[derive(Debug)]
struct Windows {
    hits: HashMap<String, VecDeque<Instant>>,
    swept_at: Instant,
}

/// Allows at most `max_requests` per key within any `window`
///
/// Owned by the application state, so every server (and every test) gets
/// its own counters. Keys with no hit inside the window are dropped at most
/// one window after their last request.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(Windows {
                hits: HashMap::new(),
                swept_at: Instant::now(),
            }),
        }
    }

    /// Record a request for `key` if it fits in the window
    pub fn check(&self, key: &str) -> Result<(), RetryAfter> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), RetryAfter> {
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if now.saturating_duration_since(windows.swept_at) >= self.window {
            let before = windows.hits.len();
            let window = self.window;
            windows
                .hits
                .retain(|_, hits| hits.back().is_some_and(|&last| now.saturating_duration_since(last) < window));
            windows.swept_at = now;
            debug!("Dropped {} idle rate limit keys", before - windows.hits.len());
        }

        let window = windows.hits.entry(key.to_string()).or_default();

        while let Some(&oldest) = window.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= self.max_requests {
            let retry = window
                .front()
                .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
                .unwrap_or(self.window);
            debug!("Rate limit hit for {} (retry in {:?})", key, retry);
            return Err(RetryAfter(retry));
        }

        window.push_back(now);
        Ok(())
    }

    /// Requests `key` may still make in the current window
    pub fn remaining(&self, key: &str) -> usize {
        let now = Instant::now();
        let windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let used = windows
            .hits
            .get(key)
            .map(|w| w.iter().filter(|&&t| now.saturating_duration_since(t) < self.window).count())
            .unwrap_or(0);
        self.max_requests.saturating_sub(used)
    }

    /// Keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .hits
            .len()
    }
}
