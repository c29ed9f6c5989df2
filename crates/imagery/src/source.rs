//! Imagery provider boundary.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use habitat_common::{Coordinate, DATE_FORMAT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ImageryError, Result};

/// One image request: a location, an acquisition date and a window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageryRequest {
    pub coordinate: Coordinate,
    pub date: NaiveDate,
    /// Width and height of the requested window, in degrees.
    pub dim: f64,
}

/// Something that can return the encoded image for a request.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait ImagerySource: Send + Sync {
    /// Fetch the raw image payload for one request.
    async fn fetch_image(&self, request: &ImageryRequest) -> Result<Bytes>;
}

/// Connection settings for [`HttpImagerySource`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Imagery endpoint, e.g. `https://api.nasa.gov/planetary/earth/imagery`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.nasa.gov/planetary/earth/imagery".to_string()
}

fn default_api_key() -> String {
    "DEMO_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Imagery source backed by an HTTP endpoint taking
/// `lon`, `lat`, `date`, `dim` and `api_key` query parameters.
pub struct HttpImagerySource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpImagerySource {
    pub fn new(config: &HttpSourceConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(ImageryError::invalid_config("imagery base_url is empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ImageryError::invalid_config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ImagerySource for HttpImagerySource {
    #[instrument(skip(self), fields(date = %request.date, location = %request.coordinate))]
    async fn fetch_image(&self, request: &ImageryRequest) -> Result<Bytes> {
        let params = [
            ("lon", request.coordinate.lon().to_string()),
            ("lat", request.coordinate.lat().to_string()),
            ("date", request.date.format(DATE_FORMAT).to_string()),
            ("dim", request.dim.to_string()),
            ("api_key", self.api_key.clone()),
        ];

        debug!(url = %self.base_url, "Requesting image");

        let response = self.client.get(&self.base_url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageryError::status(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        debug!(size = bytes.len(), "Image payload received");

        Ok(bytes)
    }
}
