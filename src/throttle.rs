// src/throttle.rs
use chrono::{DateTime, Duration, Utc};

/// Minimum-interval gate for a rate-limited upstream API. The policy is pure
/// arithmetic: callers ask how long to wait at `now`, sleep, then record the
/// call, so the spacing rule is testable without a wall clock.
#[derive(Debug, Clone)]
pub struct CallGate {
    min_interval: Duration,
    pub last_call_at: Option<DateTime<Utc>>,
}

impl CallGate {
    pub fn new(min_interval_ms: i64) -> Self {
        Self {
            min_interval: Duration::milliseconds(min_interval_ms),
            last_call_at: None,
        }
    }

    /// How long the caller must wait at `now` before the next call is allowed.
    pub fn wait_before_call(&self, now: DateTime<Utc>) -> std::time::Duration {
        match self.last_call_at {
            None => std::time::Duration::ZERO,
            Some(last_at) => {
                let elapsed = now - last_at;
                if elapsed >= self.min_interval {
                    std::time::Duration::ZERO
                } else {
                    (self.min_interval - elapsed)
                        .to_std()
                        .unwrap_or(std::time::Duration::ZERO)
                }
            }
        }
    }

    pub fn record_call(&mut self, now: DateTime<Utc>) {
        self.last_call_at = Some(now);
    }
}
