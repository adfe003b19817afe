//! Fixed-window request gate
//!
//! Counts outbound calls inside a 60 second window and rejects calls once the
//! ceiling is reached. The first window opens on the first call, and later
//! windows are reset lazily by the first call made after the previous one has
//! elapsed; there is no background timer and no queuing.

use std::time::{Duration, Instant};

use domain::WeatherError;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Default number of calls permitted per window
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Length of a rate window
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Window state for a single gate
#[derive(Debug, Clone, Copy, Default)]
struct RateWindow {
    count: u32,
    /// `None` until the first call
    window_start: Option<Instant>,
}

impl RateWindow {
    const fn started(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: Some(now),
        }
    }

    /// True when no window is open as of `now`
    fn is_expired(&self, now: Instant) -> bool {
        self.window_start
            .is_none_or(|start| now.saturating_duration_since(start) > RATE_WINDOW)
    }
}

/// Rejects outbound calls beyond a per-minute ceiling
#[derive(Debug)]
pub struct RateGate {
    window: Mutex<RateWindow>,
    limit: u32,
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

impl RateGate {
    /// Create a gate permitting `requests_per_minute` calls per window
    ///
    /// A ceiling of zero is raised to one so the gate can ever open.
    #[must_use]
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            window: Mutex::new(RateWindow::default()),
            limit: requests_per_minute.max(1),
        }
    }

    /// Configured ceiling
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Record one call, or fail if the window is exhausted
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::RateLimited` once `limit` calls have been made in
    /// the current window.
    pub fn check_and_consume(&self) -> Result<(), WeatherError> {
        self.check_and_consume_at(Instant::now())
    }

    /// Same as [`Self::check_and_consume`] with an explicit clock
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::RateLimited` when the window is exhausted.
    pub fn check_and_consume_at(&self, now: Instant) -> Result<(), WeatherError> {
        let mut window = self.window.lock();

        if window.is_expired(now) {
            debug!(previous_count = window.count, "Rate window opened");
            *window = RateWindow::started(now);
        }

        if window.count >= self.limit {
            drop(window);
            warn!(limit = self.limit, "Rate limit reached, rejecting request");
            return Err(WeatherError::RateLimited {
                limit: self.limit,
                window_secs: RATE_WINDOW.as_secs(),
            });
        }

        window.count += 1;
        Ok(())
    }

    /// Calls still permitted in the current window as of `now`
    #[must_use]
    pub fn remaining_at(&self, now: Instant) -> u32 {
        let window = self.window.lock();
        if window.is_expired(now) {
            self.limit
        } else {
            self.limit.saturating_sub(window.count)
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::ErrorKind;

    use super::*;

    #[test]
    fn permits_up_to_ceiling_then_rejects() {
        let gate = RateGate::new(3);
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(gate.check_and_consume_at(t0).is_ok());
        }
        let err = gate
            .check_and_consume_at(t0 + Duration::from_secs(10))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert_eq!(
            err,
            WeatherError::RateLimited {
                limit: 3,
                window_secs: 60
            }
        );
    }

    #[test]
    fn new_window_permits_again() {
        let gate = RateGate::new(3);
        let t0 = Instant::now();
        for _ in 0..3 {
            gate.check_and_consume_at(t0).unwrap();
        }
        assert!(gate.check_and_consume_at(t0 + Duration::from_secs(30)).is_err());

        assert!(gate.check_and_consume_at(t0 + Duration::from_secs(61)).is_ok());
    }

    #[test]
    fn window_is_not_reset_at_exactly_sixty_seconds() {
        let gate = RateGate::new(1);
        let t0 = Instant::now();
        gate.check_and_consume_at(t0).unwrap();
        assert!(gate.check_and_consume_at(t0 + RATE_WINDOW).is_err());
    }

    #[test]
    fn rejected_calls_do_not_count() {
        let gate = RateGate::new(2);
        let t0 = Instant::now();
        gate.check_and_consume_at(t0).unwrap();
        gate.check_and_consume_at(t0).unwrap();
        for _ in 0..5 {
            assert!(gate.check_and_consume_at(t0).is_err());
        }
        assert_eq!(gate.remaining_at(t0), 0);
        assert_eq!(gate.remaining_at(t0 + Duration::from_secs(61)), 2);
    }

    #[test]
    fn first_window_opens_on_first_call() {
        let gate = RateGate::new(3);
        let t0 = Instant::now();
        let first_call = t0 + Duration::from_secs(59);

        for _ in 0..3 {
            gate.check_and_consume_at(first_call).unwrap();
        }
        // An idle gate does not age its first window
        assert!(gate.check_and_consume_at(t0 + Duration::from_secs(61)).is_err());
        assert_eq!(gate.remaining_at(t0 + Duration::from_secs(61)), 0);

        assert!(
            gate.check_and_consume_at(first_call + Duration::from_secs(61))
                .is_ok()
        );
    }

    #[test]
    fn untouched_gate_reports_full_ceiling() {
        let gate = RateGate::new(4);
        assert_eq!(gate.remaining_at(Instant::now()), 4);
    }

    #[test]
    fn zero_ceiling_is_raised_to_one() {
        let gate = RateGate::new(0);
        assert_eq!(gate.limit(), 1);
        assert!(gate.check_and_consume().is_ok());
    }

    #[test]
    fn default_ceiling() {
        assert_eq!(RateGate::default().limit(), DEFAULT_REQUESTS_PER_MINUTE);
    }
}
