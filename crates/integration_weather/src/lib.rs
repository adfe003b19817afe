//! OpenWeatherMap integration
//!
//! Client for the OpenWeatherMap APIs (<https://openweathermap.org/api>).
//! Provides complete weather snapshots (current conditions, forecast, UV
//! index with an estimated fallback) and a debounced city search.

pub mod client;
pub mod config;
pub mod debounce;
pub mod geocoding;
mod http;
mod models;

pub use client::{WeatherClient, WeatherService};
pub use config::{MAX_SEARCH_RESULTS, Units, WeatherConfig};
pub use debounce::DebounceToken;
pub use geocoding::{CityLookup, CitySearch, MIN_QUERY_CHARS, normalize_query};
