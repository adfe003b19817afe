//! Guarded, rate-gated GET requests against the provider
//!
//! Every outbound call goes through [`ProviderHttp::get_json`], which checks
//! the URL guard, consumes a rate-gate slot, sends the request with the
//! configured timeout and maps failures onto the domain error kinds.

use std::sync::Arc;

use domain::WeatherError;
use infrastructure::{RateGate, UrlGuard};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::WeatherConfig;

/// Query parameter carrying the API key
const API_KEY_PARAM: &str = "appid";

/// Shared request path for the weather and search clients
#[derive(Debug, Clone)]
pub(crate) struct ProviderHttp {
    client: Client,
    config: Arc<WeatherConfig>,
    guard: Arc<UrlGuard>,
    gate: Arc<RateGate>,
}

impl ProviderHttp {
    pub fn new(
        config: Arc<WeatherConfig>,
        guard: Arc<UrlGuard>,
        gate: Arc<RateGate>,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherError::Network(e.without_url().to_string()))?;

        Ok(Self {
            client,
            config,
            guard,
            gate,
        })
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }

    /// GET `{base_url}{path}` with `params` plus the API key
    ///
    /// Validation and rate-limit failures happen before anything is sent.
    pub async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, WeatherError> {
        let endpoint = format!("{}{path}", self.config.base_url());
        self.guard.validate(&endpoint)?;
        self.gate.check_and_consume()?;

        // The key is appended last and never logged
        debug!(url = %endpoint, params = ?params, "Sending provider request");

        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query.push((API_KEY_PARAM, self.config.api_key_str()));

        let response = self
            .client
            .get(&endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(provider_error(status, &body));
        }

        serde_json::from_slice(&body)
            .map_err(|e| WeatherError::DataShape(format!("{path}: response is not JSON: {e}")))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> WeatherError {
        if e.is_timeout() {
            WeatherError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }
        } else {
            WeatherError::Network(e.without_url().to_string())
        }
    }
}

/// Deserialize a cached or fresh payload into its typed form
pub(crate) fn decode<T: DeserializeOwned>(what: &str, value: Value) -> Result<T, WeatherError> {
    serde_json::from_value(value).map_err(|e| WeatherError::DataShape(format!("{what}: {e}")))
}

/// Provider error with the message from an error body when present
fn provider_error(status: StatusCode, body: &[u8]) -> WeatherError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown status").to_string());

    WeatherError::provider(status.as_u16(), message)
}
