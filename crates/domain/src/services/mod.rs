//! Domain services - Pure computations over domain values

mod uv_estimator;

pub use uv_estimator::{DEFAULT_BASELINE_LATITUDE, UvEstimator, estimate_uv};
