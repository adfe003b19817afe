//! OpenWeatherMap client
//!
//! Turns a [`Location`] into a [`CompleteWeather`]: current conditions,
//! a three-hour forecast and a UV index. Each leg is cached on its own key,
//! gated by the shared rate gate and checked against the URL guard.
//!
//! For a city name the current-conditions call runs first, since its
//! coordinates feed the other legs. Forecast and UV then run concurrently.
//! Current and forecast failures are returned to the caller. A network,
//! provider or data-shape failure on the UV leg is replaced by an estimate and
//! the result is flagged as simulated; validation and rate-limit errors are
//! returned from every leg.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use domain::{
    CompleteWeather, ErrorKind, GeoLocation, Location, UvEstimator, UvIndex, WeatherError,
};
use infrastructure::{CacheStats, RateGate, TtlCache, UrlGuard, cache_key};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::WeatherConfig,
    geocoding::CitySearch,
    http::{ProviderHttp, decode},
    models::{CurrentResponse, ForecastResponse, UvResponse},
};

const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const UV_PATH: &str = "/data/2.5/uvi";

/// Weather lookup used by presentation layers
#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Current conditions, forecast and UV index for a location
    async fn get_complete_weather_data(
        &self,
        location: &Location,
    ) -> Result<CompleteWeather, WeatherError>;
}

/// OpenWeatherMap-backed implementation of [`WeatherService`]
#[derive(Debug)]
pub struct WeatherClient {
    http: ProviderHttp,
    cache: TtlCache<Value>,
    estimator: UvEstimator,
}

impl WeatherClient {
    /// Create a client with the production URL allow-list
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        Self::with_guard(config, UrlGuard::default())
    }

    /// Create a client with a custom URL guard
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_guard(config: WeatherConfig, guard: UrlGuard) -> Result<Self, WeatherError> {
        let gate = Arc::new(RateGate::new(config.rate_limit_per_minute));
        Self::with_components(config, guard, gate)
    }

    /// Create a client sharing an existing rate gate
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_components(
        config: WeatherConfig,
        guard: UrlGuard,
        gate: Arc<RateGate>,
    ) -> Result<Self, WeatherError> {
        let cache = TtlCache::new(config.cache_ttl(), config.cache_capacity);
        let http = ProviderHttp::new(Arc::new(config), Arc::new(guard), gate)?;
        Ok(Self {
            http,
            cache,
            estimator: UvEstimator::default(),
        })
    }

    /// Replace the UV estimator used for fallbacks
    #[must_use]
    pub const fn with_estimator(mut self, estimator: UvEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// City search sharing this client's guard, rate gate and HTTP client
    #[must_use]
    pub fn city_search(&self) -> CitySearch {
        CitySearch::from_http(self.http.clone())
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &WeatherConfig {
        self.http.config()
    }

    /// Rate gate shared by every request this client makes
    #[must_use]
    pub fn rate_gate(&self) -> Arc<RateGate> {
        Arc::clone(self.http.gate())
    }

    /// Response cache counters
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop stale cached responses
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Current conditions, forecast and UV index for `location`
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank city, out-of-range coordinates or a URL
    ///   outside the allow-list
    /// - `RateLimited` when the request ceiling is reached
    /// - `Network`/`Timeout`, `Provider` or `DataShape` from the current
    ///   conditions or forecast legs
    ///
    /// Network, provider and data-shape errors from the UV leg are absorbed.
    #[instrument(skip(self, location), fields(location = %location))]
    pub async fn get_complete_weather_data(
        &self,
        location: &Location,
    ) -> Result<CompleteWeather, WeatherError> {
        location.validate()?;

        match location {
            Location::City { city } => {
                let query = [("q", city.trim().to_string())];
                let current = self.fetch_current(location, &query).await?;
                let geo = current.location()?;
                debug!(lat = geo.latitude(), lon = geo.longitude(), "Resolved city coordinates");

                let (forecast, uv) = tokio::join!(self.fetch_forecast(geo), self.fetch_uv(geo));
                self.assemble(current, forecast?, uv)
            },
            Location::Coordinates { lat, lon } => {
                let geo = GeoLocation::new(*lat, *lon)?;
                let params = coordinate_params(geo);
                let (current, forecast, uv) = tokio::join!(
                    self.fetch_current(location, &params),
                    self.fetch_forecast(geo),
                    self.fetch_uv(geo)
                );
                self.assemble(current?, forecast?, uv)
            },
        }
    }

    async fn fetch_current(
        &self,
        location: &Location,
        query: &[(&str, String)],
    ) -> Result<CurrentResponse, WeatherError> {
        let mut params = query.to_vec();
        params.push(("units", self.config().units.to_string()));
        let key = cache_key("current", &location.cache_fragment());
        self.fetch_leg("current weather", key, CURRENT_PATH, &params, |current: CurrentResponse| {
            current.location()?;
            Ok(current)
        })
        .await
    }

    async fn fetch_forecast(&self, geo: GeoLocation) -> Result<ForecastResponse, WeatherError> {
        let mut params = coordinate_params(geo);
        params.push(("units", self.config().units.to_string()));
        let key = cache_key("forecast", &geo.cache_fragment());
        self.fetch_leg("forecast", key, FORECAST_PATH, &params, Ok).await
    }

    async fn fetch_uv(&self, geo: GeoLocation) -> Result<UvIndex, WeatherError> {
        let key = cache_key("uv", &geo.cache_fragment());
        let params = coordinate_params(geo);
        self.fetch_leg("uv index", key, UV_PATH, &params, UvResponse::into_index).await
    }

    /// Serve a leg from the cache or fetch it, then decode and check it
    ///
    /// A payload is cached only once `check` accepts it, so a rejected leg is
    /// fetched again on the next call.
    async fn fetch_leg<T, U>(
        &self,
        what: &str,
        key: String,
        path: &str,
        params: &[(&str, String)],
        check: fn(T) -> Result<U, WeatherError>,
    ) -> Result<U, WeatherError>
    where
        T: DeserializeOwned,
    {
        if let Some(cached) = self.cache.get(&key) {
            return check(decode(what, cached)?);
        }

        let payload = self.http.get_json(path, params).await?;
        let checked = check(decode(what, payload.clone())?)?;
        self.cache.set(key, payload);
        Ok(checked)
    }

    fn assemble(
        &self,
        current: CurrentResponse,
        forecast: ForecastResponse,
        uv: Result<UvIndex, WeatherError>,
    ) -> Result<CompleteWeather, WeatherError> {
        let timezone_offset_secs = current.timezone;
        let mut snapshot = current.into_snapshot()?;
        let forecast = forecast.into_bundle();
        let fetched_at = Utc::now();

        match uv {
            Ok(index) => snapshot.uv_index = index,
            // Usage errors are never masked by the estimate
            Err(e) if matches!(e.kind(), ErrorKind::Validation | ErrorKind::RateLimit) => {
                return Err(e);
            },
            Err(e) => {
                let local = local_time(fetched_at, timezone_offset_secs);
                let estimate = self
                    .estimator
                    .estimate_at(snapshot.coordinates.latitude(), local);
                warn!(
                    error = %e,
                    kind = %e.kind(),
                    estimate = estimate.value(),
                    "UV lookup failed, using estimate"
                );
                snapshot.uv_index = estimate;
                snapshot.simulated = true;
            },
        }

        info!(
            location = %snapshot.location_name,
            temperature = snapshot.temperature,
            forecast_steps = forecast.len(),
            uv = snapshot.uv_index.value(),
            simulated = snapshot.simulated,
            "Weather snapshot assembled"
        );

        Ok(CompleteWeather {
            current: snapshot,
            forecast,
            fetched_at,
            timezone_offset_secs,
        })
    }
}

#[async_trait]
impl WeatherService for WeatherClient {
    async fn get_complete_weather_data(
        &self,
        location: &Location,
    ) -> Result<CompleteWeather, WeatherError> {
        Self::get_complete_weather_data(self, location).await
    }
}

fn coordinate_params(geo: GeoLocation) -> Vec<(&'static str, String)> {
    vec![
        ("lat", geo.latitude().to_string()),
        ("lon", geo.longitude().to_string()),
    ]
}

/// Wall-clock time at the location
fn local_time(utc: DateTime<Utc>, offset_secs: i32) -> NaiveDateTime {
    utc.naive_utc() + Duration::seconds(i64::from(offset_secs))
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike};

    use super::*;

    #[test]
    fn local_time_applies_offset() {
        let utc = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
        let local = local_time(utc, 3600);
        assert_eq!(local.hour(), 0);
        assert_eq!(local.month(), 1);

        let local = local_time(utc, -5 * 3600);
        assert_eq!(local.hour(), 18);
        assert_eq!(local.month(), 12);
    }

    #[test]
    fn coordinate_params_use_full_precision() {
        let params = coordinate_params(GeoLocation::new(51.5085, -0.1257).unwrap());
        assert_eq!(params[0], ("lat", "51.5085".to_string()));
        assert_eq!(params[1], ("lon", "-0.1257".to_string()));
    }

    #[test]
    fn client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WeatherClient>();
    }

    #[test]
    fn new_client_has_empty_cache() {
        let client = WeatherClient::new(WeatherConfig::default()).unwrap();
        assert_eq!(client.cache_stats(), CacheStats::default());
        assert_eq!(client.rate_gate().limit(), 60);
    }
}
