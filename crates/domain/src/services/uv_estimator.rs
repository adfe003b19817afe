//! UV index estimation
//!
//! Deterministic stand-in for a live UV reading. The value follows the shape
//! of a clear-sky day (peak around solar noon), shifted by season and scaled
//! by latitude. It is not a physical model, and results must always be
//! flagged as simulated when shown.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::value_objects::UvIndex;

/// Latitude (absolute degrees) at which the latitude factor bottoms out
pub const DEFAULT_BASELINE_LATITUDE: f64 = 60.0;

const FIRST_DAYLIGHT_HOUR: u32 = 6;
const LAST_DAYLIGHT_HOUR: u32 = 18;

/// Latitude factor at the equator
const EQUATOR_FACTOR: f64 = 1.2;
/// Latitude factor at and beyond the baseline latitude
const BASELINE_FACTOR: f64 = 0.5;

/// Seasonal offset by month for the northern hemisphere (Jan..Dec)
const NORTHERN_SEASON_OFFSET: [f64; 12] = [
    -2.0, -1.5, -0.5, 0.5, 1.5, 2.0, 2.0, 1.5, 0.5, -0.5, -1.5, -2.0,
];

/// Estimates a plausible UV index from latitude and local time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvEstimator {
    baseline_latitude: f64,
}

impl Default for UvEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_LATITUDE)
    }
}

impl UvEstimator {
    /// Create an estimator tapering toward `baseline_latitude`
    ///
    /// Non-positive or non-finite baselines fall back to the default.
    #[must_use]
    pub fn new(baseline_latitude: f64) -> Self {
        let baseline_latitude = if baseline_latitude.is_finite() && baseline_latitude > 0.0 {
            baseline_latitude.min(90.0)
        } else {
            DEFAULT_BASELINE_LATITUDE
        };
        Self { baseline_latitude }
    }

    /// Estimate the UV index for a latitude, local hour (0-23) and month (1-12)
    ///
    /// Returns 0 outside the daylight window. Out-of-range months get no
    /// seasonal adjustment.
    #[must_use]
    pub fn estimate(&self, latitude: f64, hour: u32, month: u32) -> UvIndex {
        let Some(base) = hour_base(hour) else {
            return UvIndex::default();
        };

        let seasonal = seasonal_offset(latitude, month);
        let factor = self.latitude_factor(latitude);

        UvIndex::clamped((base + seasonal) * factor)
    }

    /// Estimate for a wall-clock time already shifted to the location
    #[must_use]
    pub fn estimate_at(&self, latitude: f64, local_time: NaiveDateTime) -> UvIndex {
        self.estimate(latitude, local_time.hour(), local_time.month())
    }

    fn latitude_factor(&self, latitude: f64) -> f64 {
        let abs_lat = if latitude.is_finite() {
            latitude.abs().min(self.baseline_latitude)
        } else {
            self.baseline_latitude
        };
        let progress = abs_lat / self.baseline_latitude;
        (BASELINE_FACTOR - EQUATOR_FACTOR).mul_add(progress, EQUATOR_FACTOR)
    }
}

/// Base index for the hour band; `None` outside daylight
const fn hour_base(hour: u32) -> Option<f64> {
    if hour < FIRST_DAYLIGHT_HOUR || hour > LAST_DAYLIGHT_HOUR {
        return None;
    }
    let base = match hour {
        11..=13 => 8.0,
        10 | 14 => 6.5,
        9 | 15 => 4.5,
        8 | 16 => 2.5,
        7 | 17 => 1.0,
        _ => 0.3,
    };
    Some(base)
}

/// Summer raises the index, winter lowers it; seasons flip south of the equator
fn seasonal_offset(latitude: f64, month: u32) -> f64 {
    if !(1..=12).contains(&month) {
        return 0.0;
    }
    let index = (month - 1) as usize;
    let index = if latitude < 0.0 { (index + 6) % 12 } else { index };
    NORTHERN_SEASON_OFFSET[index]
}

/// Estimate with the default baseline latitude
#[must_use]
pub fn estimate_uv(latitude: f64, hour: u32, month: u32) -> UvIndex {
    UvEstimator::default().estimate(latitude, hour, month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn night_hours_are_zero() {
        for hour in [0, 2, 5, 19, 23] {
            assert!(estimate_uv(20.0, hour, 6).value().abs() < f64::EPSILON);
        }
    }

    #[test]
    fn midday_peaks() {
        let noon = estimate_uv(20.0, 12, 6).value();
        let morning = estimate_uv(20.0, 8, 6).value();
        let evening = estimate_uv(20.0, 17, 6).value();
        assert!(noon > morning);
        assert!(noon > evening);
    }

    #[test]
    fn summer_beats_winter_in_the_north() {
        assert!(estimate_uv(45.0, 12, 7).value() > estimate_uv(45.0, 12, 1).value());
    }

    #[test]
    fn seasons_flip_in_the_south() {
        assert!(estimate_uv(-33.9, 12, 1).value() > estimate_uv(-33.9, 12, 7).value());
    }

    #[test]
    fn equator_beats_high_latitudes() {
        assert!(estimate_uv(0.0, 12, 3).value() > estimate_uv(65.0, 12, 3).value());
    }

    #[test]
    fn beyond_baseline_latitude_is_flat() {
        assert_eq!(estimate_uv(60.0, 12, 6), estimate_uv(80.0, 12, 6));
    }

    #[test]
    fn known_value() {
        // (8.0 + 2.0) * 1.2 = 12.0, clamped to 11
        assert!((estimate_uv(0.0, 12, 6).value() - 11.0).abs() < f64::EPSILON);
        // (4.5 - 2.0) * 0.5 = 1.25 -> 1.3
        assert!((estimate_uv(70.0, 9, 1).value() - 1.3).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_month_has_no_seasonal_offset() {
        // 8.0 * 1.2 = 9.6
        assert!((estimate_uv(0.0, 12, 13).value() - 9.6).abs() < f64::EPSILON);
    }

    #[test]
    fn estimate_at_uses_hour_and_month() {
        let local = NaiveDate::from_ymd_opt(2024, 6, 21)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(
            UvEstimator::default().estimate_at(51.5, local),
            estimate_uv(51.5, 12, 6)
        );
    }

    #[test]
    fn custom_baseline() {
        let narrow = UvEstimator::new(30.0);
        assert_eq!(narrow.estimate(30.0, 12, 3), narrow.estimate(50.0, 12, 3));
        assert_eq!(UvEstimator::new(-5.0), UvEstimator::default());
    }
}
