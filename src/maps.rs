//! Maps provider client: driving/transit directions and place text search
//!
//! Calls the Google Maps web services with plain GET requests. Payloads are
//! handed back untouched; shaping them is the normalizer's job.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{MapsConfig, UpstreamConfig};
use crate::{Result, WanderError};

const PROVIDER: &str = "Google Maps";

/// In-band `status` values reported by the provider on a 2xx response
const ERROR_STATUSES: [&str; 5] = [
    "REQUEST_DENIED",
    "INVALID_REQUEST",
    "OVER_QUERY_LIMIT",
    "OVER_DAILY_LIMIT",
    "UNKNOWN_ERROR",
];

/// Directions travel mode understood by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
    Transit,
}

impl TravelMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directions and place search capability
#[async_trait]
pub trait MapsApi: Send + Sync {
    /// Route alternatives between two free-text or `lat,lng` locations
    async fn directions(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
        alternatives: bool,
    ) -> Result<Value>;

    /// First page of a free-text place search
    async fn place_search(&self, query: &str) -> Result<Value>;
}

/// Google Maps web service client
pub struct GoogleMapsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleMapsClient {
    /// Create a new maps client
    pub fn new(config: &MapsConfig, upstream: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(upstream.timeout_seconds.into()))
            .user_agent(concat!("WanderWise/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// GET `{base_url}/{endpoint}` with the given query and the API key appended
    async fn get_json(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| WanderError::config("GOOGLE_MAPS_API_KEY is not set"))?;

        let query = params
            .iter()
            .chain(std::iter::once(&("key", api_key)))
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}/{endpoint}?{query}", self.base_url);

        debug!("Calling maps endpoint {}", endpoint);
        let start_time = Instant::now();

        // reqwest errors carry the URL, and with it the API key.
        let response = self.client.get(&url).send().await.map_err(|e| {
            let e = e.without_url();
            error!("Maps request to {} failed: {}", endpoint, e);
            WanderError::upstream(PROVIDER, format!("request failed: {e}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let e = e.without_url();
            WanderError::upstream(PROVIDER, format!("failed to read response: {e}"))
        })?;

        let total_duration = start_time.elapsed();
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow maps API response from {}: {:.3}s",
                endpoint,
                total_duration.as_secs_f64()
            );
        }

        if !status.is_success() {
            let payload = serde_json::from_str(&body)
                .unwrap_or_else(|_| Value::String(body.clone()));
            return Err(WanderError::upstream_response(
                PROVIDER,
                format!("HTTP {status}"),
                status.as_u16(),
                Some(payload),
            ));
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            WanderError::upstream_response(
                PROVIDER,
                format!("invalid JSON in response: {e}"),
                status.as_u16(),
                Some(Value::String(body.clone())),
            )
        })?;

        // Still a successful call: the payload goes back to the caller as is.
        if let Some(provider_status) = value.get("status").and_then(Value::as_str) {
            if ERROR_STATUSES.contains(&provider_status) {
                warn!(
                    "Maps endpoint {} reported status {}: {}",
                    endpoint,
                    provider_status,
                    value
                        .get("error_message")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or("no error message")
                );
            }
        }

        info!(
            "Maps endpoint {} answered in {:.3}s",
            endpoint,
            total_duration.as_secs_f64()
        );

        Ok(value)
    }
}

#[async_trait]
impl MapsApi for GoogleMapsClient {
    #[instrument(skip(self))]
    async fn directions(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
        alternatives: bool,
    ) -> Result<Value> {
        let alternatives = if alternatives { "true" } else { "false" };
        self.get_json(
            "directions/json",
            &[
                ("origin", origin),
                ("destination", destination),
                ("mode", mode.as_str()),
                ("alternatives", alternatives),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn place_search(&self, query: &str) -> Result<Value> {
        self.get_json("place/textsearch/json", &[("query", query)])
            .await
    }
}
