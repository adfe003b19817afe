//! City search result entity

use serde::{Deserialize, Serialize};

use crate::value_objects::GeoLocation;

/// A place matching a city search query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCandidate {
    /// Place name
    pub name: String,
    /// ISO country code
    pub country: String,
    /// State or region, when the provider knows one
    pub state: Option<String>,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Label for pickers ("Portland, Oregon, US")
    pub display_name: String,
}

impl CityCandidate {
    /// Create a candidate, deriving the display name
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        state: Option<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        let name = name.into();
        let country = country.into();
        let state = state.filter(|s| !s.trim().is_empty());
        let display_name = match &state {
            Some(state) => format!("{name}, {state}, {country}"),
            None => format!("{name}, {country}"),
        };
        Self {
            name,
            country,
            state,
            lat,
            lon,
            display_name,
        }
    }

    /// Coordinates of the candidate
    #[must_use]
    pub const fn geo(&self) -> GeoLocation {
        GeoLocation::new_unchecked(self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_with_state() {
        let c = CityCandidate::new("Portland", "US", Some("Oregon".into()), 45.5, -122.6);
        assert_eq!(c.display_name, "Portland, Oregon, US");
    }

    #[test]
    fn display_name_without_state() {
        let c = CityCandidate::new("London", "GB", None, 51.5, -0.12);
        assert_eq!(c.display_name, "London, GB");

        let c = CityCandidate::new("Lyon", "FR", Some("  ".into()), 45.7, 4.8);
        assert_eq!(c.display_name, "Lyon, FR");
        assert!(c.state.is_none());
    }

    #[test]
    fn geo_returns_coordinates() {
        let c = CityCandidate::new("London", "GB", None, 51.5, -0.12);
        assert!((c.geo().latitude() - 51.5).abs() < f64::EPSILON);
    }
}
