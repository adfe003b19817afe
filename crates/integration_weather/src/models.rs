//! OpenWeatherMap response payloads
//!
//! Only the fields the core relies on are required (`coord`/`main` on current
//! conditions, `list` and per-step `dt` on forecasts, `value` on UV). Anything
//! else the provider omits becomes zero or [`UNKNOWN_TEXT`] during
//! normalisation.

use chrono::{DateTime, Utc};
use domain::{
    CityCandidate, ForecastBundle, ForecastEntry, GeoLocation, UNKNOWN_TEXT, UvIndex,
    WeatherCondition, WeatherError, WeatherSnapshot,
};
use serde::Deserialize;

/// Coordinates of a provider result
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// `weather[]` element
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ConditionPayload {
    pub id: u16,
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// `main` block shared by current conditions and forecast steps
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct MainPayload {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WindPayload {
    pub speed: f64,
    pub deg: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CloudsPayload {
    pub all: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SysPayload {
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

/// `GET /data/2.5/weather`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CurrentResponse {
    pub coord: Coord,
    pub main: MainPayload,
    #[serde(default)]
    pub weather: Vec<ConditionPayload>,
    #[serde(default)]
    pub wind: WindPayload,
    #[serde(default)]
    pub clouds: CloudsPayload,
    #[serde(default)]
    pub visibility: f64,
    #[serde(default)]
    pub sys: SysPayload,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dt: i64,
    /// Shift from UTC in seconds
    #[serde(default)]
    pub timezone: i32,
}

/// `list[]` element of the forecast response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ForecastItem {
    pub dt: i64,
    #[serde(default)]
    pub dt_txt: Option<String>,
    #[serde(default)]
    pub main: MainPayload,
    #[serde(default)]
    pub weather: Vec<ConditionPayload>,
    #[serde(default)]
    pub wind: WindPayload,
    #[serde(default)]
    pub clouds: CloudsPayload,
    /// Probability of precipitation, 0.0-1.0
    #[serde(default)]
    pub pop: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ForecastCity {
    pub name: Option<String>,
    pub country: Option<String>,
    pub timezone: i32,
}

/// `GET /data/2.5/forecast`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ForecastResponse {
    pub list: Vec<ForecastItem>,
    #[serde(default)]
    pub city: ForecastCity,
}

/// `GET /data/2.5/uvi`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UvResponse {
    pub value: f64,
}

/// `GET /geo/1.0/direct` element
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GeocodingResult {
    pub name: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

fn text_or_unknown(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_TEXT)
        .to_string()
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(value: f64) -> u8 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn degrees(value: f64) -> u16 {
    if value.is_finite() {
        value.round().rem_euclid(360.0) as u16
    } else {
        0
    }
}

struct ConditionFields {
    code: u16,
    condition: WeatherCondition,
    summary: String,
    description: String,
    icon: String,
}

fn condition_fields(weather: &[ConditionPayload]) -> ConditionFields {
    weather.first().map_or_else(
        || ConditionFields {
            code: 0,
            condition: WeatherCondition::Unknown,
            summary: UNKNOWN_TEXT.to_string(),
            description: UNKNOWN_TEXT.to_string(),
            icon: UNKNOWN_TEXT.to_string(),
        },
        |w| ConditionFields {
            code: w.id,
            condition: WeatherCondition::from_owm_code(w.id),
            summary: text_or_unknown(w.main.as_deref()),
            description: text_or_unknown(w.description.as_deref()),
            icon: text_or_unknown(w.icon.as_deref()),
        },
    )
}

impl CurrentResponse {
    /// Validated coordinates of the resolved location
    pub fn location(&self) -> Result<GeoLocation, WeatherError> {
        GeoLocation::new(self.coord.lat, self.coord.lon).map_err(|_| {
            WeatherError::DataShape(format!(
                "coordinates out of range: {}, {}",
                self.coord.lat, self.coord.lon
            ))
        })
    }

    /// Normalise into a snapshot; the UV fields are filled in by the caller
    pub fn into_snapshot(self) -> Result<WeatherSnapshot, WeatherError> {
        let coordinates = self.location()?;
        let cond = condition_fields(&self.weather);

        Ok(WeatherSnapshot {
            location_name: text_or_unknown(self.name.as_deref()),
            country: text_or_unknown(self.sys.country.as_deref()),
            coordinates,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: percent(self.main.humidity),
            pressure: self.main.pressure,
            wind_speed: self.wind.speed,
            wind_direction: degrees(self.wind.deg),
            cloud_cover: percent(self.clouds.all),
            visibility: self.visibility,
            condition_code: cond.code,
            condition: cond.condition,
            summary: cond.summary,
            description: cond.description,
            icon: cond.icon,
            uv_index: UvIndex::default(),
            simulated: false,
            sunrise: timestamp(self.sys.sunrise),
            sunset: timestamp(self.sys.sunset),
            observed_at: timestamp(self.dt),
        })
    }
}

impl ForecastItem {
    fn into_entry(self) -> ForecastEntry {
        let cond = condition_fields(&self.weather);
        let time = timestamp(self.dt);
        let time_text = self
            .dt_txt
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| time.format("%Y-%m-%d %H:%M:%S").to_string());

        ForecastEntry {
            time,
            time_text,
            temperature: self.main.temp,
            temperature_min: self.main.temp_min,
            temperature_max: self.main.temp_max,
            feels_like: self.main.feels_like,
            humidity: percent(self.main.humidity),
            condition_code: cond.code,
            condition: cond.condition,
            description: cond.description,
            icon: cond.icon,
            wind_speed: self.wind.speed,
            wind_direction: degrees(self.wind.deg),
            cloud_cover: percent(self.clouds.all),
            precipitation_probability: percent(self.pop * 100.0),
        }
    }
}

impl ForecastResponse {
    /// Normalise into a bundle of at most 40 steps
    pub fn into_bundle(self) -> ForecastBundle {
        ForecastBundle::new(self.list.into_iter().map(ForecastItem::into_entry).collect())
    }
}

impl UvResponse {
    /// Live reading, clamped to the index scale
    pub fn into_index(self) -> Result<UvIndex, WeatherError> {
        UvIndex::from_measurement(self.value)
    }
}

impl GeocodingResult {
    /// Candidate for a result with a name and valid coordinates
    pub fn into_candidate(self) -> Option<CityCandidate> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        let geo = GeoLocation::new(self.lat?, self.lon?).ok()?;
        Some(CityCandidate::new(
            name.trim(),
            text_or_unknown(self.country.as_deref()),
            self.state,
            geo.latitude(),
            geo.longitude(),
        ))
    }
}
