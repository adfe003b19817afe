//! SSRF guard for outbound requests
//!
//! Every URL the weather and search clients are about to fetch is checked
//! against a fixed host allow-list and must use `https`. The allow-list is
//! set at construction and never derived from request input.

use std::collections::BTreeSet;

use domain::WeatherError;
use tracing::warn;
use url::Url;

/// Provider hosts permitted by [`UrlGuard::default`]
pub const DEFAULT_ALLOWED_HOSTS: [&str; 2] = ["api.openweathermap.org", "tile.openweathermap.org"];

const SECURE_SCHEME: &str = "https";

/// Host allow-list with an encrypted-transport requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlGuard {
    allowed_hosts: BTreeSet<String>,
    allow_plain_http: bool,
}

impl Default for UrlGuard {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_HOSTS)
    }
}

impl UrlGuard {
    /// Guard permitting only the given hosts over `https`
    #[must_use]
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            allow_plain_http: false,
        }
    }

    /// Also accept `http` for the allow-listed hosts
    ///
    /// Meant for local mock servers; production guards keep the default.
    #[must_use]
    pub const fn allow_plain_http(mut self) -> Self {
        self.allow_plain_http = true;
        self
    }

    /// Hosts this guard permits
    pub fn allowed_hosts(&self) -> impl Iterator<Item = &str> {
        self.allowed_hosts.iter().map(String::as_str)
    }

    /// Check that `url` may be requested
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Validation` if the URL does not parse, uses a
    /// scheme other than `https`, carries credentials, or targets a host
    /// outside the allow-list.
    pub fn validate(&self, url: &str) -> Result<(), WeatherError> {
        let parsed = Url::parse(url).map_err(|e| reject(url, &format!("unparseable URL: {e}")))?;
        self.validate_url(&parsed)
    }

    /// Check an already parsed URL
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::validate`].
    pub fn validate_url(&self, url: &Url) -> Result<(), WeatherError> {
        let scheme_ok = match url.scheme() {
            SECURE_SCHEME => true,
            "http" => self.allow_plain_http,
            _ => false,
        };
        if !scheme_ok {
            return Err(reject(
                url.as_str(),
                &format!("scheme '{}' is not permitted", url.scheme()),
            ));
        }

        if !url.username().is_empty() || url.password().is_some() {
            return Err(reject(url.as_str(), "embedded credentials are not permitted"));
        }

        let Some(host) = url.host_str() else {
            return Err(reject(url.as_str(), "missing host"));
        };
        let host = host.to_ascii_lowercase();
        if !self.allowed_hosts.contains(&host) {
            return Err(reject(url.as_str(), &format!("host '{host}' is not allow-listed")));
        }

        Ok(())
    }
}

fn reject(url: &str, reason: &str) -> WeatherError {
    warn!(reason = %reason, "Blocked outbound request");
    let shown = url.split('?').next().unwrap_or(url);
    WeatherError::validation(format!("Blocked request to {shown}: {reason}"))
}
