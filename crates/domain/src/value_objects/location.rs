//! Location request value object
//!
//! A weather lookup starts either from a free-text city name or from a
//! coordinate pair, never both.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GeoLocation;
use crate::errors::WeatherError;

/// Maximum accepted length of a city name
const MAX_CITY_LEN: usize = 100;

/// Where to look up weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    /// Free-text city name, resolved by the provider
    City {
        /// City name as entered
        city: String,
    },
    /// Explicit coordinates
    Coordinates {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lon: f64,
    },
}

impl Location {
    /// Location from a city name
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Validation` if the name is blank or too long.
    pub fn city(name: impl Into<String>) -> Result<Self, WeatherError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::validation("city name must not be empty"));
        }
        if trimmed.chars().count() > MAX_CITY_LEN {
            return Err(WeatherError::validation(format!(
                "city name must be at most {MAX_CITY_LEN} characters"
            )));
        }
        Ok(Self::City {
            city: trimmed.to_string(),
        })
    }

    /// Location from coordinates
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Validation` if the coordinates are out of range.
    pub fn coordinates(lat: f64, lon: f64) -> Result<Self, WeatherError> {
        GeoLocation::new(lat, lon)?;
        Ok(Self::Coordinates { lat, lon })
    }

    /// Re-check the invariants of a location built by hand or deserialized
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Validation` on a blank city or bad coordinates.
    pub fn validate(&self) -> Result<(), WeatherError> {
        match self {
            Self::City { city } => Self::city(city.as_str()).map(|_| ()),
            Self::Coordinates { lat, lon } => GeoLocation::new(*lat, *lon).map(|_| ()),
        }
    }

    /// Coordinates if this is a coordinate-based location
    #[must_use]
    pub const fn geo(&self) -> Option<GeoLocation> {
        match self {
            Self::City { .. } => None,
            Self::Coordinates { lat, lon } => Some(GeoLocation::new_unchecked(*lat, *lon)),
        }
    }

    /// Identifier used in cache keys (`london`, `40.71,-74.01`)
    #[must_use]
    pub fn cache_fragment(&self) -> String {
        match self {
            Self::City { city } => city.trim().to_lowercase(),
            Self::Coordinates { lat, lon } => GeoLocation::new_unchecked(*lat, *lon).cache_fragment(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City { city } => write!(f, "{city}"),
            Self::Coordinates { lat, lon } => write!(f, "{lat:.4}, {lon:.4}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_is_trimmed() {
        let loc = Location::city("  London ").unwrap();
        assert_eq!(
            loc,
            Location::City {
                city: "London".to_string()
            }
        );
        assert_eq!(loc.cache_fragment(), "london");
        assert!(loc.geo().is_none());
    }

    #[test]
    fn blank_city_rejected() {
        assert!(Location::city("").is_err());
        assert!(Location::city("   ").is_err());
        assert!(Location::city("x".repeat(101)).is_err());
    }

    #[test]
    fn coordinates_validated() {
        let loc = Location::coordinates(40.7128, -74.006).unwrap();
        assert_eq!(loc.cache_fragment(), "40.71,-74.01");
        assert!(loc.geo().is_some());
        assert!(Location::coordinates(100.0, 0.0).is_err());
    }

    #[test]
    fn validate_hand_built_values() {
        assert!(
            Location::City {
                city: " ".to_string()
            }
            .validate()
            .is_err()
        );
        assert!(Location::Coordinates { lat: 0.0, lon: 200.0 }.validate().is_err());
        assert!(Location::Coordinates { lat: 1.0, lon: 2.0 }.validate().is_ok());
    }

    #[test]
    fn deserializes_either_shape() {
        let city: Location = serde_json::from_str(r#"{"city":"Paris"}"#).unwrap();
        assert!(matches!(city, Location::City { .. }));

        let coords: Location = serde_json::from_str(r#"{"lat":48.85,"lon":2.35}"#).unwrap();
        assert!(matches!(coords, Location::Coordinates { .. }));
    }
}
