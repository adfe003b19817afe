//! Domain-level errors
//!
//! Every failure surfaced by the weather core carries an explicit kind so
//! callers can branch on [`ErrorKind`] instead of inspecting messages.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`WeatherError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input or a disallowed outbound URL
    Validation,
    /// Request ceiling for the current window exceeded
    RateLimit,
    /// Timeout, abort or connection failure
    Network,
    /// Provider answered with a non-2xx status
    Provider,
    /// Provider answered with JSON that lacks required fields
    DataShape,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Network => write!(f, "network"),
            Self::Provider => write!(f, "provider"),
            Self::DataShape => write!(f, "data_shape"),
        }
    }
}

/// Errors that can occur while resolving weather data
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeatherError {
    /// Invalid input or an outbound URL rejected by the guard
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Too many requests inside the current rate window
    #[error("Rate limit exceeded: more than {limit} requests in {window_secs}s")]
    RateLimited {
        /// Configured ceiling per window
        limit: u32,
        /// Window length in seconds
        window_secs: u64,
    },

    /// Connection to the provider failed
    #[error("Network error: {0}")]
    Network(String),

    /// Request aborted after the configured timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Provider returned a non-success HTTP status
    #[error("Provider returned HTTP {status}: {message}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Provider message, if any
        message: String,
    },

    /// Response parsed but is missing required fields
    #[error("Unexpected response shape: {0}")]
    DataShape(String),
}

impl WeatherError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a provider error for the given status
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    /// Explicit kind tag for this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::RateLimited { .. } => ErrorKind::RateLimit,
            Self::Network(_) | Self::Timeout { .. } => ErrorKind::Network,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::DataShape(_) => ErrorKind::DataShape,
        }
    }

    /// Returns true if a caller-side retry may succeed
    ///
    /// Validation and rate-limit errors are usage errors and never retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout { .. } => true,
            Self::Provider { status, .. } => *status == 429 || *status >= 500,
            Self::Validation(_) | Self::RateLimited { .. } | Self::DataShape(_) => false,
        }
    }

    /// HTTP status carried by a provider error
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_variants() {
        assert_eq!(
            WeatherError::validation("bad").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            WeatherError::RateLimited {
                limit: 60,
                window_secs: 60
            }
            .kind(),
            ErrorKind::RateLimit
        );
        assert_eq!(
            WeatherError::Network("reset".into()).kind(),
            ErrorKind::Network
        );
        assert_eq!(
            WeatherError::Timeout { timeout_secs: 8 }.kind(),
            ErrorKind::Network
        );
        assert_eq!(
            WeatherError::provider(404, "city not found").kind(),
            ErrorKind::Provider
        );
        assert_eq!(
            WeatherError::DataShape("missing main".into()).kind(),
            ErrorKind::DataShape
        );
    }

    #[test]
    fn retryable_errors() {
        assert!(WeatherError::Network("reset".into()).is_retryable());
        assert!(WeatherError::Timeout { timeout_secs: 8 }.is_retryable());
        assert!(WeatherError::provider(503, "down").is_retryable());
        assert!(WeatherError::provider(429, "slow down").is_retryable());
    }

    #[test]
    fn non_retryable_errors() {
        assert!(!WeatherError::validation("empty city").is_retryable());
        assert!(
            !WeatherError::RateLimited {
                limit: 3,
                window_secs: 60
            }
            .is_retryable()
        );
        assert!(!WeatherError::provider(404, "city not found").is_retryable());
        assert!(!WeatherError::DataShape("no coord".into()).is_retryable());
    }

    #[test]
    fn provider_error_exposes_status() {
        assert_eq!(WeatherError::provider(404, "x").status(), Some(404));
        assert_eq!(WeatherError::Network("x".into()).status(), None);
    }

    #[test]
    fn error_display() {
        let err = WeatherError::provider(404, "city not found");
        assert_eq!(err.to_string(), "Provider returned HTTP 404: city not found");

        let err = WeatherError::RateLimited {
            limit: 3,
            window_secs: 60,
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains("60s"));

        let err = WeatherError::Timeout { timeout_secs: 8 };
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn kind_display() {
        assert_eq!(ErrorKind::RateLimit.to_string(), "rate_limit");
        assert_eq!(ErrorKind::DataShape.to_string(), "data_shape");
    }
}
