//! UV index value object
//!
//! A UV index bounded to `[0, 11]` and rounded to one decimal.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::UvIndex;
//!
//! assert_eq!(UvIndex::clamped(13.7).value(), 11.0);
//! assert_eq!(UvIndex::clamped(4.26).value(), 4.3);
//! assert!(UvIndex::from_measurement(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::WeatherError;

/// Upper bound of the reported scale
pub const UV_INDEX_MAX: f64 = 11.0;

/// UV index in `[0, 11]`, one decimal
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UvIndex(f64);

impl UvIndex {
    /// Clamp into `[0, 11]` and round to one decimal; NaN becomes 0
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        let bounded = value.clamp(0.0, UV_INDEX_MAX);
        Self((bounded * 10.0).round() / 10.0)
    }

    /// Accept a live reading from the provider
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::DataShape` for negative or non-finite readings.
    pub fn from_measurement(value: f64) -> Result<Self, WeatherError> {
        if !value.is_finite() || value < 0.0 {
            return Err(WeatherError::DataShape(format!(
                "UV reading {value} is not a valid index"
            )));
        }
        Ok(Self::clamped(value))
    }

    /// Get the index as f64
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// WHO exposure category label
    #[must_use]
    pub fn risk_level(self) -> &'static str {
        match self.0 {
            v if v < 3.0 => "low",
            v if v < 6.0 => "moderate",
            v if v < 8.0 => "high",
            v if v < 11.0 => "very high",
            _ => "extreme",
        }
    }
}

impl fmt::Display for UvIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

impl From<UvIndex> for f64 {
    fn from(uv: UvIndex) -> Self {
        uv.0
    }
}
