//! City search via the provider's direct geocoding endpoint
//!
//! Queries are normalised (trimmed, lowercased, inner whitespace collapsed)
//! before anything else happens. Queries shorter than two characters return
//! nothing without a request. A [`DebounceToken`] is issued when a lookup
//! starts, before any request goes out. An identical query repeated inside
//! the debounce window shares that lookup, waiting for it if it is still in
//! flight; otherwise results come from the TTL cache or a fresh request.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use domain::{CityCandidate, WeatherError};
use infrastructure::{CacheStats, RateGate, TtlCache, UrlGuard, cache_key};
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::{
    config::{MAX_SEARCH_RESULTS, WeatherConfig},
    debounce::DebounceToken,
    http::{ProviderHttp, decode},
    models::GeocodingResult,
};

const GEOCODING_PATH: &str = "/geo/1.0/direct";

/// Shortest query that is sent to the provider
pub const MIN_QUERY_CHARS: usize = 2;

/// Trait for city lookups
#[async_trait]
pub trait CityLookup: Send + Sync {
    /// Up to `limit` (clamped to 1-5) places matching `query`
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CityCandidate>, WeatherError>;
}

/// Result slot shared by every caller of one debounced lookup
type SharedLookup = Arc<OnceCell<Vec<CityCandidate>>>;

/// Debounced, cached city search
#[derive(Debug)]
pub struct CitySearch {
    http: ProviderHttp,
    cache: TtlCache<Vec<CityCandidate>>,
    pending: Mutex<Option<DebounceToken<SharedLookup>>>,
}

impl CitySearch {
    /// Create a search client with the production URL allow-list
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        Self::with_guard(config, UrlGuard::default())
    }

    /// Create a search client with a custom URL guard
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_guard(config: WeatherConfig, guard: UrlGuard) -> Result<Self, WeatherError> {
        let gate = Arc::new(RateGate::new(config.rate_limit_per_minute));
        Self::with_components(config, guard, gate)
    }

    /// Create a search client sharing an existing rate gate
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_components(
        config: WeatherConfig,
        guard: UrlGuard,
        gate: Arc<RateGate>,
    ) -> Result<Self, WeatherError> {
        let http = ProviderHttp::new(Arc::new(config), Arc::new(guard), gate)?;
        Ok(Self::from_http(http))
    }

    pub(crate) fn from_http(http: ProviderHttp) -> Self {
        let config = http.config();
        let cache = TtlCache::new(config.cache_ttl(), config.cache_capacity);
        Self {
            http,
            cache,
            pending: Mutex::new(None),
        }
    }

    /// Places matching `query`, at most `limit` (clamped to 1-5)
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `RateLimited`, `Network`/`Timeout`, `Provider`
    /// or `DataShape` from the geocoding request.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CityCandidate>, WeatherError> {
        self.search_at(query, limit, Instant::now()).await
    }

    /// Same as [`Self::search`] with an explicit clock for the debounce
    /// window and cache expiry
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::search`].
    #[instrument(skip(self, now))]
    pub async fn search_at(
        &self,
        query: &str,
        limit: usize,
        now: Instant,
    ) -> Result<Vec<CityCandidate>, WeatherError> {
        let normalized = normalize_query(query);
        if normalized.chars().count() < MIN_QUERY_CHARS {
            debug!("Query too short, skipping search");
            return Ok(Vec::new());
        }
        let limit = limit.clamp(1, self.http.config().search_limit());

        let lookup = {
            let mut pending = self.pending.lock();
            match pending.as_ref().and_then(|token| token.resolve(&normalized, now)) {
                Some(lookup) => {
                    debug!(query = %normalized, "Debounced repeat search");
                    lookup
                },
                None => {
                    let lookup = SharedLookup::default();
                    *pending = Some(DebounceToken::new(
                        normalized.clone(),
                        Arc::clone(&lookup),
                        now,
                        self.http.config().debounce_window(),
                    ));
                    lookup
                },
            }
        };

        // A failed lookup leaves the slot empty, so the next caller retries
        let candidates = lookup
            .get_or_try_init(|| self.cached_or_fetch(&normalized, now))
            .await?;

        Ok(truncate(candidates.clone(), limit))
    }

    /// Cancel the debounce token so the next search goes past it
    pub fn cancel_pending(&self) {
        if let Some(token) = self.pending.lock().as_mut() {
            token.cancel();
        }
    }

    /// Result cache counters
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn cached_or_fetch(
        &self,
        normalized: &str,
        now: Instant,
    ) -> Result<Vec<CityCandidate>, WeatherError> {
        let key = cache_key("search", normalized);
        if let Some(cached) = self.cache.get_at(&key, now) {
            return Ok(cached);
        }
        let fetched = self.fetch(normalized).await?;
        self.cache.set_at(key, fetched.clone(), now);
        Ok(fetched)
    }

    /// Fetch the configured maximum so every smaller limit is served locally
    async fn fetch(&self, normalized: &str) -> Result<Vec<CityCandidate>, WeatherError> {
        let params = [
            ("q", normalized.to_string()),
            ("limit", self.http.config().search_limit().to_string()),
        ];
        let payload = self.http.get_json(GEOCODING_PATH, &params).await?;
        let results: Vec<GeocodingResult> = decode("geocoding", payload)?;

        let candidates: Vec<CityCandidate> = results
            .into_iter()
            .filter_map(GeocodingResult::into_candidate)
            .take(MAX_SEARCH_RESULTS)
            .collect();
        debug!(query = %normalized, results = candidates.len(), "City search completed");
        Ok(candidates)
    }
}

#[async_trait]
impl CityLookup for CitySearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CityCandidate>, WeatherError> {
        Self::search(self, query, limit).await
    }
}

/// Trim, lowercase and collapse inner whitespace
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn truncate(mut candidates: Vec<CityCandidate>, limit: usize) -> Vec<CityCandidate> {
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_query_collapses_whitespace() {
        assert_eq!(normalize_query("  New   York "), "new york");
        assert_eq!(normalize_query("LONDON"), "london");
        assert_eq!(normalize_query(" \t "), "");
    }

    #[test]
    fn truncate_respects_limit() {
        let candidates = vec![
            CityCandidate::new("A", "GB", None, 1.0, 1.0),
            CityCandidate::new("B", "GB", None, 2.0, 2.0),
        ];
        assert_eq!(truncate(candidates.clone(), 1).len(), 1);
        assert_eq!(truncate(candidates, 5).len(), 2);
    }

    #[tokio::test]
    async fn short_query_returns_empty_without_request() {
        // Unroutable base URL: any request would fail
        let config = WeatherConfig::for_testing("https://api.openweathermap.org.invalid");
        let search = CitySearch::new(config).unwrap();

        assert!(search.search("l", 5).await.unwrap().is_empty());
        assert!(search.search("   ", 5).await.unwrap().is_empty());
        assert_eq!(search.cache_stats().misses, 0);
    }

    #[tokio::test]
    async fn disallowed_host_is_a_validation_error() {
        let config = WeatherConfig::for_testing("https://evil.example");
        let search = CitySearch::new(config).unwrap();

        let err = search.search("london", 5).await.unwrap_err();
        assert_eq!(err.kind(), domain::ErrorKind::Validation);
    }
}
