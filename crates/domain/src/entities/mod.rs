//! Domain entities - Records produced per lookup and discarded afterwards

mod city_candidate;
mod weather;

pub use city_candidate::CityCandidate;
pub use weather::{
    CompleteWeather, DailySummary, ForecastBundle, ForecastEntry, MAX_FORECAST_DAYS,
    MAX_FORECAST_ENTRIES, UNKNOWN_TEXT, WeatherCondition, WeatherSnapshot,
};
