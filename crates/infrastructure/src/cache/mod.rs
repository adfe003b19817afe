//! Cache implementations
//!
//! - `TtlCache`: bounded in-memory cache with per-entry TTL and oldest-first
//!   eviction, shared by the weather and city search clients

mod ttl_cache;

pub use ttl_cache::{CacheStats, TtlCache};

/// Build a cache key from a leg prefix and a location fragment
///
/// The fragment is lowercased and trimmed so that "London" and " london "
/// share an entry.
#[must_use]
pub fn cache_key(prefix: &str, fragment: &str) -> String {
    format!("{prefix}_{}", fragment.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_deterministic() {
        assert_eq!(cache_key("current", "london"), cache_key("current", "london"));
    }

    #[test]
    fn cache_key_normalizes_fragment() {
        assert_eq!(cache_key("current", " London "), "current_london");
    }

    #[test]
    fn cache_key_keeps_coordinates() {
        assert_eq!(cache_key("forecast", "51.51,-0.13"), "forecast_51.51,-0.13");
    }

    #[test]
    fn cache_key_differs_by_prefix() {
        assert_ne!(cache_key("current", "paris"), cache_key("forecast", "paris"));
    }
}
