//! Short-window deduplication for repeated searches
//!
//! A [`DebounceToken`] remembers the last query, its result and when it was
//! issued. While the token is active, an identical query is answered from the
//! token instead of going to the network. The token is owned by its caller and
//! can be cancelled at any time.

use std::time::{Duration, Instant};

/// Last answered query and its result, valid for a short window
#[derive(Debug, Clone)]
pub struct DebounceToken<T> {
    query: String,
    result: T,
    issued_at: Instant,
    window: Duration,
    cancelled: bool,
}

impl<T: Clone> DebounceToken<T> {
    /// Token for `query` answered with `result` at `issued_at`
    pub fn new(query: impl Into<String>, result: T, issued_at: Instant, window: Duration) -> Self {
        Self {
            query: query.into(),
            result,
            issued_at,
            window,
            cancelled: false,
        }
    }

    /// Normalised query this token answers
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// True while not cancelled and `now` is within the window
    #[must_use]
    pub fn is_active(&self, now: Instant) -> bool {
        !self.cancelled && now.saturating_duration_since(self.issued_at) < self.window
    }

    /// The stored result if `query` matches and the token is active
    #[must_use]
    pub fn resolve(&self, query: &str, now: Instant) -> Option<T> {
        (self.is_active(now) && self.query == query).then(|| self.result.clone())
    }

    /// Deactivate the token; later lookups miss
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// True once [`Self::cancel`] has been called
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn resolves_identical_query_within_window() {
        let t0 = Instant::now();
        let token = DebounceToken::new("london", vec![1, 2], t0, WINDOW);

        assert_eq!(
            token.resolve("london", t0 + Duration::from_millis(100)),
            Some(vec![1, 2])
        );
        assert!(token.is_active(t0 + Duration::from_millis(299)));
    }

    #[test]
    fn misses_other_queries() {
        let t0 = Instant::now();
        let token = DebounceToken::new("london", 1, t0, WINDOW);
        assert_eq!(token.resolve("londo", t0), None);
    }

    #[test]
    fn expires_after_window() {
        let t0 = Instant::now();
        let token = DebounceToken::new("london", 1, t0, WINDOW);
        assert!(!token.is_active(t0 + WINDOW));
        assert_eq!(token.resolve("london", t0 + Duration::from_millis(400)), None);
    }

    #[test]
    fn cancel_deactivates() {
        let t0 = Instant::now();
        let mut token = DebounceToken::new("paris", 1, t0, WINDOW);
        token.cancel();
        assert!(token.is_cancelled());
        assert!(!token.is_active(t0));
        assert_eq!(token.resolve("paris", t0), None);
        assert_eq!(token.query(), "paris");
    }
}
