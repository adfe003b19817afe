//! Provider configuration
//!
//! Built once at startup and handed to every component constructor.

use std::{fmt, path::Path, time::Duration};

use domain::WeatherError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Upper bound for city search results
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Measurement system requested from the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius, metres per second
    #[default]
    Metric,
    /// Fahrenheit, miles per hour
    Imperial,
    /// Kelvin, metres per second
    Standard,
}

impl Units {
    /// Value of the `units` query parameter
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
            Self::Standard => "standard",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather provider configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Provider base URL (default: <https://api.openweathermap.org>)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Provider API key (sensitive - uses `SecretString`)
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: SecretString,

    /// Measurement system (default: metric)
    #[serde(default)]
    pub units: Units,

    /// Per-request timeout in seconds (default: 8)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Response cache TTL in seconds (default: 600, 0 disables caching)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Maximum cached responses (default: 100)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Outbound requests permitted per minute (default: 60)
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_minute: u32,

    /// Window in which an identical city search is answered locally (default: 300)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Results requested per city search, 1-5 (default: 5)
    #[serde(default = "default_search_max_results")]
    pub search_max_results: usize,
}

fn default_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_api_key() -> SecretString {
    SecretString::from(String::new())
}

const fn default_timeout() -> u64 {
    8
}

const fn default_cache_ttl() -> u64 {
    600
}

const fn default_cache_capacity() -> usize {
    100
}

const fn default_rate_limit() -> u32 {
    60
}

const fn default_debounce_ms() -> u64 {
    300
}

const fn default_search_max_results() -> usize {
    MAX_SEARCH_RESULTS
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            units: Units::default(),
            timeout_secs: default_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
            rate_limit_per_minute: default_rate_limit(),
            debounce_ms: default_debounce_ms(),
            search_max_results: default_search_max_results(),
        }
    }
}

impl fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("units", &self.units)
            .field("timeout_secs", &self.timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_capacity", &self.cache_capacity)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("debounce_ms", &self.debounce_ms)
            .field("search_max_results", &self.search_max_results)
            .finish()
    }
}

impl WeatherConfig {
    /// Load configuration from defaults, `skycast.toml` and the environment
    ///
    /// Environment variables use the `SKYCAST_` prefix, e.g.
    /// `SKYCAST_API_KEY` or `SKYCAST_CACHE_TTL_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value has the wrong type.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Like [`Self::load`], reading `path` instead of `skycast.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or malformed.
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("skycast").required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // Double underscore so field names keep their single underscores
            .add_source(
                config::Environment::with_prefix("SKYCAST")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Config pointing at a local mock server
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::from("test-key"),
            ..Self::default()
        }
    }

    /// Replace the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = SecretString::from(api_key.into());
        self
    }

    /// Check for values that would make the client unusable
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(WeatherError::validation(
                "api_key is not set (use SKYCAST_API_KEY or skycast.toml)",
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(WeatherError::validation("base_url must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(WeatherError::validation("timeout_secs must be greater than 0"));
        }
        if self.cache_capacity == 0 {
            return Err(WeatherError::validation("cache_capacity must be greater than 0"));
        }
        if self.rate_limit_per_minute == 0 {
            return Err(WeatherError::validation(
                "rate_limit_per_minute must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// The API key value
    #[must_use]
    pub fn api_key_str(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Response cache TTL
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// City search debounce window
    #[must_use]
    pub const fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Result count for city searches, clamped to 1-5
    #[must_use]
    pub fn search_limit(&self) -> usize {
        self.search_max_results.clamp(1, MAX_SEARCH_RESULTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = WeatherConfig::default();
        assert_eq!(config.base_url, "https://api.openweathermap.org");
        assert_eq!(config.units, Units::Metric);
        assert_eq!(config.timeout_secs, 8);
        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.rate_limit_per_minute, 60);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.search_max_results, 5);
        assert!(config.api_key_str().is_empty());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = WeatherConfig::default().with_api_key("super-secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_serialization_skips_api_key() {
        let config = WeatherConfig::for_testing("http://127.0.0.1:1234");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("test-key"));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn test_deserialization_fills_defaults() {
        let config: WeatherConfig =
            serde_json::from_str(r#"{"api_key":"abc","units":"imperial"}"#).unwrap();
        assert_eq!(config.api_key_str(), "abc");
        assert_eq!(config.units, Units::Imperial);
        assert_eq!(config.timeout_secs, 8);
        assert_eq!(config.cache_ttl_secs, 600);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let err = WeatherConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("api_key"));
        assert!(WeatherConfig::default().with_api_key("k").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let base = WeatherConfig::for_testing("http://localhost");

        let mut config = base.clone();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.cache_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.rate_limit_per_minute = 0;
        assert!(config.validate().is_err());

        let mut config = base;
        config.cache_ttl_secs = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_limit_is_clamped() {
        let mut config = WeatherConfig::default();
        config.search_max_results = 0;
        assert_eq!(config.search_limit(), 1);
        config.search_max_results = 50;
        assert_eq!(config.search_limit(), 5);
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = WeatherConfig::for_testing("http://127.0.0.1:9000/");
        assert_eq!(config.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_units_query_values() {
        assert_eq!(Units::Metric.as_str(), "metric");
        assert_eq!(Units::Imperial.to_string(), "imperial");
        assert_eq!(Units::Standard.as_str(), "standard");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = WeatherConfig::load_from(None).unwrap();
        assert_eq!(config.timeout_secs, 8);
    }
}
