//! Circuit breaker for provider rate limits and quota exhaustion.
//!
//! Twelve Data answers over-quota requests with HTTP 429 (or a JSON body with
//! `code: 429`). After `failure_threshold` consecutive failures, or one hard
//! refusal, the breaker opens and every request is refused until the cooldown
//! has elapsed.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// One-minute cooldown after three consecutive failures, matching the
    /// per-minute credit window of the free API tier.
    pub fn per_minute_quota() -> Self {
        Self::new(Duration::from_secs(60), 3)
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request may be sent now. An expired cooldown closes the breaker.
    pub fn is_allowed(&self) -> bool {
        let mut state = self.lock();
        match state.opened_at {
            None => true,
            Some(opened) if opened.elapsed() >= self.cooldown => {
                *state = BreakerState::default();
                true
            }
            Some(_) => false,
        }
    }

    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.failure_threshold {
            state.opened_at = Some(Instant::now());
        }
    }

    /// Open immediately (quota exhausted, key revoked).
    pub fn trip(&self) {
        self.lock().opened_at = Some(Instant::now());
    }

    pub fn remaining_cooldown(&self) -> Duration {
        match self.lock().opened_at {
            None => Duration::ZERO,
            Some(opened) => self.cooldown.saturating_sub(opened.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 3);
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
        assert!(cb.remaining_cooldown() > Duration::ZERO);
    }

    #[test]
    fn success_resets_the_count() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 2);
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert!(cb.is_allowed());
    }

    #[test]
    fn trip_then_cooldown_expiry() {
        let cb = CircuitBreaker::new(Duration::from_millis(10), 3);
        cb.trip();
        assert!(!cb.is_allowed());
        std::thread::sleep(Duration::from_millis(15));
        assert!(cb.is_allowed());
        assert_eq!(cb.remaining_cooldown(), Duration::ZERO);
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let cb = CircuitBreaker::new(Duration::from_secs(60), 0);
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
    }
}
