//! Weather domain entities
//!
//! Normalized records handed to the UI. Every field is populated: numeric
//! fields default to zero and text fields to [`UNKNOWN_TEXT`] when the
//! provider omits them, so consumers never need to null-check.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{GeoLocation, UvIndex};

/// Placeholder for text fields missing from a provider payload
pub const UNKNOWN_TEXT: &str = "N/A";

/// Five days of three-hour steps
pub const MAX_FORECAST_ENTRIES: usize = 40;

/// Days covered by [`ForecastBundle::daily_summaries`]
pub const MAX_FORECAST_DAYS: usize = 5;

/// Weather condition derived from provider condition ids
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// Thunderstorm (2xx)
    Thunderstorm,
    /// Drizzle (3xx)
    Drizzle,
    /// Rain (5xx except 511)
    Rain,
    /// Freezing rain (511)
    FreezingRain,
    /// Snow and sleet (6xx)
    Snow,
    /// Mist, smoke, haze, dust, fog (7xx)
    Atmosphere,
    /// Clear sky (800)
    Clear,
    /// Few or scattered clouds (801, 802)
    PartlyCloudy,
    /// Broken clouds or overcast (803, 804)
    Cloudy,
    /// Unknown condition
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Convert a provider condition id to `WeatherCondition`
    #[must_use]
    pub const fn from_owm_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            511 => Self::FreezingRain,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Atmosphere,
            800 => Self::Clear,
            801 | 802 => Self::PartlyCloudy,
            803 | 804 => Self::Cloudy,
            _ => Self::Unknown,
        }
    }

    /// Get a human-readable description of the weather condition
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "Thunderstorm",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::Atmosphere => "Mist",
            Self::Clear => "Clear sky",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Place name reported by the provider
    pub location_name: String,
    /// ISO country code
    pub country: String,
    /// Resolved coordinates
    pub coordinates: GeoLocation,
    /// Temperature in configured units
    pub temperature: f64,
    /// Apparent temperature in configured units
    pub feels_like: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Pressure in hPa
    pub pressure: f64,
    /// Wind speed in configured units
    pub wind_speed: f64,
    /// Wind direction in degrees (0-360)
    pub wind_direction: u16,
    /// Cloud cover percentage (0-100)
    pub cloud_cover: u8,
    /// Visibility in meters
    pub visibility: f64,
    /// Provider condition id
    pub condition_code: u16,
    /// Condition category
    pub condition: WeatherCondition,
    /// Short condition group ("Rain")
    pub summary: String,
    /// Detailed condition text ("light rain")
    pub description: String,
    /// Provider icon code ("10d")
    pub icon: String,
    /// UV index, live or estimated
    pub uv_index: UvIndex,
    /// True when `uv_index` was estimated rather than measured
    pub simulated: bool,
    /// Sunrise (UTC)
    pub sunrise: DateTime<Utc>,
    /// Sunset (UTC)
    pub sunset: DateTime<Utc>,
    /// Observation time reported by the provider (UTC)
    pub observed_at: DateTime<Utc>,
}

/// One three-hour forecast step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Start of the step (UTC)
    pub time: DateTime<Utc>,
    /// Provider's text timestamp ("2024-01-15 12:00:00")
    pub time_text: String,
    /// Temperature in configured units
    pub temperature: f64,
    /// Minimum temperature for the step
    pub temperature_min: f64,
    /// Maximum temperature for the step
    pub temperature_max: f64,
    /// Apparent temperature
    pub feels_like: f64,
    /// Relative humidity percentage (0-100)
    pub humidity: u8,
    /// Provider condition id
    pub condition_code: u16,
    /// Condition category
    pub condition: WeatherCondition,
    /// Detailed condition text
    pub description: String,
    /// Provider icon code
    pub icon: String,
    /// Wind speed
    pub wind_speed: f64,
    /// Wind direction in degrees
    pub wind_direction: u16,
    /// Cloud cover percentage (0-100)
    pub cloud_cover: u8,
    /// Probability of precipitation (0-100)
    pub precipitation_probability: u8,
}

/// Aggregated forecast for one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Local date
    pub date: NaiveDate,
    /// Lowest step minimum
    pub temperature_min: f64,
    /// Highest step maximum
    pub temperature_max: f64,
    /// Most frequent condition of the day
    pub condition: WeatherCondition,
    /// Highest precipitation probability of the day
    pub precipitation_probability: u8,
}

/// Ordered forecast steps, at most [`MAX_FORECAST_ENTRIES`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastBundle {
    entries: Vec<ForecastEntry>,
}

impl ForecastBundle {
    /// Build a bundle, ordering by time and dropping steps beyond the limit
    #[must_use]
    pub fn new(mut entries: Vec<ForecastEntry>) -> Self {
        entries.sort_by_key(|e| e.time);
        entries.truncate(MAX_FORECAST_ENTRIES);
        Self { entries }
    }

    /// Forecast steps in chronological order
    #[must_use]
    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the bundle has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group steps by local date (UTC shifted by `utc_offset_secs`)
    ///
    /// Returns at most [`MAX_FORECAST_DAYS`] days in chronological order.
    #[must_use]
    pub fn daily_summaries(&self, utc_offset_secs: i32) -> Vec<DailySummary> {
        let offset = Duration::seconds(i64::from(utc_offset_secs));
        let mut days: BTreeMap<NaiveDate, Vec<&ForecastEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let local_date = (entry.time + offset).date_naive();
            days.entry(local_date).or_default().push(entry);
        }

        days.into_iter()
            .take(MAX_FORECAST_DAYS)
            .map(|(date, steps)| summarize_day(date, &steps))
            .collect()
    }
}

fn summarize_day(date: NaiveDate, steps: &[&ForecastEntry]) -> DailySummary {
    let temperature_min = steps
        .iter()
        .map(|s| s.temperature_min)
        .fold(f64::INFINITY, f64::min);
    let temperature_max = steps
        .iter()
        .map(|s| s.temperature_max)
        .fold(f64::NEG_INFINITY, f64::max);
    let precipitation_probability = steps
        .iter()
        .map(|s| s.precipitation_probability)
        .max()
        .unwrap_or(0);

    let mut counts: BTreeMap<WeatherCondition, usize> = BTreeMap::new();
    for step in steps {
        *counts.entry(step.condition).or_default() += 1;
    }
    // Ties resolve to the more severe condition (lower enum ordinal)
    let condition = counts
        .into_iter()
        .max_by(|(ca, na), (cb, nb)| na.cmp(nb).then_with(|| cb.cmp(ca)))
        .map_or(WeatherCondition::Unknown, |(c, _)| c);

    DailySummary {
        date,
        temperature_min,
        temperature_max,
        condition,
        precipitation_probability,
    }
}

/// Full result of a weather lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteWeather {
    /// Current conditions including the UV reading
    #[serde(flatten)]
    pub current: WeatherSnapshot,
    /// Three-hour forecast
    pub forecast: ForecastBundle,
    /// When the lookup was assembled (UTC)
    pub fetched_at: DateTime<Utc>,
    /// Offset of the location's local time from UTC, in seconds
    pub timezone_offset_secs: i32,
}

impl CompleteWeather {
    /// UV index attached to the current conditions
    #[must_use]
    pub const fn uv(&self) -> UvIndex {
        self.current.uv_index
    }

    /// True when the UV index is an estimate
    #[must_use]
    pub const fn simulated(&self) -> bool {
        self.current.simulated
    }

    /// Daily aggregation of the forecast in the location's local time
    #[must_use]
    pub fn daily(&self) -> Vec<DailySummary> {
        self.forecast.daily_summaries(self.timezone_offset_secs)
    }
}
