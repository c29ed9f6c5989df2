//! Species occurrence lookup (GBIF occurrence search API).

use std::time::Duration;

use habitat_common::Coordinate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{BiodiversityError, Result};

/// Settings for [`OccurrenceClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum number of records requested per lookup
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.gbif.org/v1/occurrence/search".to_string()
}

fn default_limit() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for OccurrenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OccurrenceResponse {
    #[serde(default)]
    results: Vec<OccurrenceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OccurrenceRecord {
    decimal_latitude: Option<f64>,
    decimal_longitude: Option<f64>,
}

/// Looks up where a species has been observed.
pub struct OccurrenceClient {
    client: Client,
    config: OccurrenceConfig,
}

impl OccurrenceClient {
    pub fn new(config: OccurrenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BiodiversityError::InvalidConfig(format!("HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Coordinates of every georeferenced occurrence of `scientific_name`.
    ///
    /// Records missing either coordinate, or carrying an out-of-range one,
    /// are left out.
    #[instrument(skip(self))]
    pub async fn species_locations(&self, scientific_name: &str) -> Result<Vec<Coordinate>> {
        let limit = self.config.limit.to_string();
        let params = [
            ("scientificName", scientific_name),
            ("hasCoordinate", "true"),
            ("limit", limit.as_str()),
        ];

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BiodiversityError::status(
                "occurrence search",
                response.status().as_u16(),
            ));
        }

        let body: OccurrenceResponse = response.json().await?;
        let total = body.results.len();

        let locations: Vec<Coordinate> = body
            .results
            .into_iter()
            .filter_map(|record| match (record.decimal_latitude, record.decimal_longitude) {
                (Some(lat), Some(lon)) => match Coordinate::new(lat, lon) {
                    Ok(c) => Some(c),
                    Err(e) => {
                        warn!(error = %e, "Dropping occurrence with invalid coordinates");
                        None
                    }
                },
                _ => None,
            })
            .collect();

        debug!(total, kept = locations.len(), "Filtered occurrence records");
        info!(count = locations.len(), "Found species locations");

        Ok(locations)
    }
}
