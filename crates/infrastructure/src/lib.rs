//! Infrastructure layer - Shared plumbing for provider clients
//!
//! Holds the in-memory response cache, the outbound rate gate, the host
//! allow-list checked before every request, and tracing setup.

pub mod cache;
pub mod rate_limit;
pub mod telemetry;
pub mod validation;

pub use cache::{CacheStats, TtlCache, cache_key};
pub use rate_limit::{DEFAULT_REQUESTS_PER_MINUTE, RATE_WINDOW, RateGate};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_tracing};
pub use validation::{DEFAULT_ALLOWED_HOSTS, UrlGuard};
