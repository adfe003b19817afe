//! Domain layer for Skycast
//!
//! Contains the weather records handed to consumers, location value objects,
//! the error taxonomy and the UV estimation fallback.
//! This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use errors::{ErrorKind, WeatherError};
pub use services::{UvEstimator, estimate_uv};
pub use value_objects::*;
