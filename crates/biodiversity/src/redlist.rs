//! Endangered-species registry client (IUCN Red List API v3).

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use crate::error::{BiodiversityError, Result};

/// Settings for [`RedListClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedListConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    /// Pause between page requests, required by the provider's rate limit
    #[serde(default = "default_page_delay_secs")]
    pub page_delay_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://apiv3.iucnredlist.org/api/v3".to_string()
}

fn default_page_delay_secs() -> u64 {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for RedListConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            page_delay_secs: default_page_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// One registry entry.
///
/// Only the fields the pipeline reads are typed; everything else the
/// registry sends is kept in `extra` so the record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub scientific_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SpeciesRecord {
    pub fn new(scientific_name: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            taxonid: None,
            category: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpeciesPage {
    #[serde(default)]
    result: Vec<SpeciesRecord>,
}

#[derive(Debug, Deserialize)]
struct HabitatResponse {
    #[serde(default)]
    result: Vec<HabitatEntry>,
}

#[derive(Debug, Deserialize)]
struct HabitatEntry {
    habitat: String,
}

/// Client for the conservation-status registry.
pub struct RedListClient {
    client: Client,
    config: RedListConfig,
}

impl RedListClient {
    pub fn new(config: RedListConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BiodiversityError::InvalidConfig(format!("HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Walk `species/page/{n}` from page 0 until a page comes back empty.
    ///
    /// A non-success status ends the walk early and returns the records
    /// gathered so far. Pages are spaced by `page_delay_secs`.
    #[instrument(skip(self))]
    pub async fn fetch_all_species(&self) -> Result<Vec<SpeciesRecord>> {
        let delay = Duration::from_secs(self.config.page_delay_secs);
        let mut all_species = Vec::new();
        let mut page: u32 = 0;

        loop {
            let url = format!("{}/species/page/{}", self.config.base_url, page);
            info!(page = page + 1, "Fetching registry page");

            let response = self
                .client
                .get(&url)
                .query(&[("token", self.config.token.as_str())])
                .send()
                .await?;

            if !response.status().is_success() {
                warn!(
                    page,
                    status = response.status().as_u16(),
                    collected = all_species.len(),
                    "Registry page request failed, stopping pagination"
                );
                break;
            }

            let body: SpeciesPage = response.json().await?;
            if body.result.is_empty() {
                break;
            }

            all_species.extend(body.result);
            page += 1;

            tokio::time::sleep(delay).await;
        }

        info!(count = all_species.len(), pages = page, "Registry download complete");
        Ok(all_species)
    }

    /// Habitat names recorded for a species.
    #[instrument(skip(self))]
    pub async fn habitats(&self, scientific_name: &str) -> Result<Vec<String>> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| BiodiversityError::InvalidConfig(format!("registry base_url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                BiodiversityError::InvalidConfig(format!(
                    "registry base_url cannot take a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["habitats", "species", "name", scientific_name]);

        let response = self
            .client
            .get(url)
            .query(&[("token", self.config.token.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BiodiversityError::status(
                "habitat lookup",
                response.status().as_u16(),
            ));
        }

        let body: HabitatResponse = response.json().await?;
        if body.result.is_empty() {
            info!("No habitat data recorded");
        }

        Ok(body.result.into_iter().map(|h| h.habitat).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_record_keeps_unknown_fields() {
        let json = r#"{"taxonid":3,"scientific_name":"Aaadonta angaurana","category":"CR","kingdom_name":"ANIMALIA"}"#;
        let record: SpeciesRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.scientific_name, "Aaadonta angaurana");
        assert_eq!(record.taxonid, Some(3));
        assert_eq!(record.extra["kingdom_name"], "ANIMALIA");

        let back: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(back, serde_json::from_str::<Value>(json).unwrap());
    }

    #[test]
    fn test_config_defaults() {
        let config: RedListConfig = serde_json::from_str(r#"{"token":"abc"}"#).unwrap();
        assert_eq!(config.page_delay_secs, 2);
        assert!(config.base_url.ends_with("/api/v3"));
    }
}
