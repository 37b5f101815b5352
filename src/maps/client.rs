use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::parser::shortest_leg_duration;
use super::types::{DistanceError, DistanceResolver, TravelTime};
use super::DIRECTIONS_PATH;
use crate::config::AppConfig;
use crate::error::CtrError;

/// HTTP client for the Google Directions API.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    client: Client,
    host: String,
    api_key: String,
}

impl GoogleMapsClient {
    /// Creates a client for `host` (e.g. `https://maps.googleapis.com`).
    /// Every request is bounded by `timeout`.
    pub fn new(host: &str, api_key: &str, timeout: Duration) -> Result<Self, CtrError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CtrError::Config(format!("failed to build directions client: {}", e)))?;
        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CtrError> {
        Self::new(
            &config.google_host,
            &config.google_api_key,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    fn directions_url(&self) -> String {
        format!("{}{}", self.host, DIRECTIONS_PATH)
    }
}

#[async_trait::async_trait]
impl DistanceResolver for GoogleMapsClient {
    async fn resolve_travel_time(&self, from: &str, to: &str) -> Result<TravelTime, DistanceError> {
        if from.is_empty() || to.is_empty() {
            return Err(DistanceError::EmptyAddress);
        }

        let response = self
            .client
            .get(self.directions_url())
            .query(&[("origin", from), ("destination", to), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DistanceError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DistanceError::Payload(e.to_string()))?;
        let travel_time = shortest_leg_duration(&body)?;
        log::debug!("Travel time from '{}' to '{}': {:?}", from, to, travel_time);
        Ok(travel_time)
    }
}
