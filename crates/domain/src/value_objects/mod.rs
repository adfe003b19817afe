//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod location;
mod uv_index;

pub use geo_location::GeoLocation;
pub use location::Location;
pub use uv_index::{UV_INDEX_MAX, UvIndex};
