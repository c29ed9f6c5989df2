//! Revisit-cadence imagery fetcher.
//!
//! One request per revisit step, one attempt per request:
//! - Steps run strictly in date order, each awaited before the next
//! - Non-success status, transport and decode failures skip the step
//! - No retries and no backoff, so call volume equals the step count

use chrono::NaiveDate;
use futures::stream::{self, Stream, StreamExt};
use habitat_common::{Coordinate, DateRange, PixelGrid, DEFAULT_REVISIT_DAYS};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decode::decode_image;
use crate::error::{ImageryError, Result};
use crate::source::{ImageryRequest, ImagerySource};

/// Side length of the requested window, in degrees.
pub const DEFAULT_WINDOW_DEGREES: f64 = 0.15;

/// Step and window settings for [`ImageryFetcher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Days between successive requests
    #[serde(default = "default_revisit_days")]
    pub revisit_days: i64,
    /// Requested window size in degrees
    #[serde(default = "default_window_degrees")]
    pub window_degrees: f64,
}

fn default_revisit_days() -> i64 {
    DEFAULT_REVISIT_DAYS
}

fn default_window_degrees() -> f64 {
    DEFAULT_WINDOW_DEGREES
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            revisit_days: DEFAULT_REVISIT_DAYS,
            window_degrees: DEFAULT_WINDOW_DEGREES,
        }
    }
}

impl FetcherConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.revisit_days < 1 {
            return Err(ImageryError::invalid_config(format!(
                "revisit_days must be >= 1, got {}",
                self.revisit_days
            )));
        }
        if !self.window_degrees.is_finite() || self.window_degrees <= 0.0 {
            return Err(ImageryError::invalid_config(format!(
                "window_degrees must be > 0, got {}",
                self.window_degrees
            )));
        }
        Ok(())
    }
}

/// A successfully retrieved and decoded image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSample {
    pub date: NaiveDate,
    pub pixels: PixelGrid,
}

/// Walks a date range and yields one [`ImageSample`] per successful step.
pub struct ImageryFetcher {
    source: Box<dyn ImagerySource>,
    config: FetcherConfig,
}

impl ImageryFetcher {
    pub fn new(source: Box<dyn ImagerySource>, config: FetcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Number of requests a full walk of `range` issues.
    pub fn step_count(&self, range: &DateRange) -> usize {
        (range.span_days() / self.config.revisit_days + 1) as usize
    }

    /// Lazily fetch the imagery for `coordinate` over `range`.
    ///
    /// Nothing is requested until the stream is polled, and dropping the
    /// stream stops the walk. Every call re-issues all requests.
    pub fn fetch<'a>(
        &'a self,
        coordinate: Coordinate,
        range: DateRange,
    ) -> impl Stream<Item = ImageSample> + Send + 'a {
        // revisit_days was validated in new(), so the schedule always builds.
        let dates = range
            .revisits(self.config.revisit_days)
            .into_iter()
            .flatten();

        info!(
            location = %coordinate,
            start = %range.start(),
            end = %range.end(),
            steps = self.step_count(&range),
            "Starting imagery walk"
        );

        stream::iter(dates).filter_map(move |date| async move { self.fetch_step(coordinate, date).await })
    }

    /// Collect the whole walk into a Vec, in date order.
    pub async fn fetch_all(&self, coordinate: Coordinate, range: DateRange) -> Vec<ImageSample> {
        self.fetch(coordinate, range).collect().await
    }

    async fn fetch_step(&self, coordinate: Coordinate, date: NaiveDate) -> Option<ImageSample> {
        let request = ImageryRequest {
            coordinate,
            date,
            dim: self.config.window_degrees,
        };

        match self.try_fetch_step(&request).await {
            Ok(sample) => {
                info!(
                    date = %date,
                    width = sample.pixels.width(),
                    height = sample.pixels.height(),
                    "Image retrieved"
                );
                Some(sample)
            }
            Err(e) => {
                warn!(
                    date = %date,
                    status = ?e.http_status(),
                    error = %e,
                    "Imagery step failed, skipping"
                );
                None
            }
        }
    }

    async fn try_fetch_step(&self, request: &ImageryRequest) -> Result<ImageSample> {
        let bytes = self.source.fetch_image(request).await?;
        let pixels = decode_image(&bytes)?;
        Ok(ImageSample {
            date: request.date,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetcherConfig::default();
        assert_eq!(config.revisit_days, 16);
        assert_eq!(config.window_degrees, 0.15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let zero_cadence = FetcherConfig {
            revisit_days: 0,
            ..FetcherConfig::default()
        };
        assert!(zero_cadence.validate().is_err());

        let bad_window = FetcherConfig {
            window_degrees: f64::NAN,
            ..FetcherConfig::default()
        };
        assert!(bad_window.validate().is_err());
    }
}
