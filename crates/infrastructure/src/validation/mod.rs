//! Outbound request validation
//!
//! Provides the host allow-list that every provider request passes through.

pub mod url_guard;

pub use url_guard::{DEFAULT_ALLOWED_HOSTS, UrlGuard};
