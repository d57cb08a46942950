//! Circuit breaker for the text model API
//!
//! After `threshold` failed completions in a row the breaker opens and
//! rejects calls without touching the network. Once the cool-down has passed
//! a single probe goes through; its result closes or re-opens the breaker.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Breaker position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls go through
    Closed,
    /// Calls are rejected until the cool-down ends
    Open,
    /// Cool-down over, next call is a probe
    HalfOpen,
}

#[derive(Debug, Default)]
struct Tally {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Guards one model client against quota exhaustion and outages
///
/// ```
/// use autoblog_content::CircuitBreaker;
///
/// let breaker = CircuitBreaker::default();
/// for _ in 0..3 {
///     breaker.record_failure();
/// }
/// assert!(!breaker.can_execute());
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    tally: Mutex<Tally>,
    threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            tally: Mutex::new(Tally::default()),
            threshold: threshold.max(1),
            cooldown,
        }
    }

    fn with_tally<R>(&self, f: impl FnOnce(&mut Tally) -> R) -> R {
        let mut tally = self.tally.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut tally)
    }

    pub fn state(&self) -> CircuitState {
        self.with_tally(|t| match t.opened_at {
            None => CircuitState::Closed,
            Some(at) if at.elapsed() >= self.cooldown => CircuitState::HalfOpen,
            Some(_) => CircuitState::Open,
        })
    }

    pub fn record_success(&self) {
        self.with_tally(|t| *t = Tally::default());
    }

    pub fn record_failure(&self) {
        self.with_tally(|t| {
            t.consecutive_failures += 1;
            // A failed probe restarts the cool-down
            if t.consecutive_failures >= self.threshold {
                t.opened_at = Some(Instant::now());
            }
        });
    }

    /// `false` only while open
    pub fn can_execute(&self) -> bool {
        self.state() != CircuitState::Open
    }

    pub fn failure_count(&self) -> u32 {
        self.with_tally(|t| t.consecutive_failures)
    }

    /// Time left before a probe is allowed; zero unless open
    pub fn retry_in(&self) -> Duration {
        self.with_tally(|t| match t.opened_at {
            Some(at) => self.cooldown.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        })
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(60))
    }
}
