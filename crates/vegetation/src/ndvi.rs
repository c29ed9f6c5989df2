//! Normalized Difference Vegetation Index.
//!
//! `NDVI = (NIR - Red) / (NIR + Red + ε)`, computed per pixel from two
//! channels of an 8-bit image. ε is always added, so a pixel with both bands
//! at zero yields exactly `0.0` and every other non-negative pixel lands
//! strictly inside (-1, 1).

use habitat_common::PixelGrid;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VegetationError};
use crate::grid::NdviGrid;

/// Default denominator offset.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Which image channels stand in for the near-infrared and red bands.
///
/// The default treats channel 0 as NIR and channel 2 as red, the layout of
/// false-colour composites served as RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandMapping {
    pub nir_channel: usize,
    pub red_channel: usize,
}

impl Default for BandMapping {
    fn default() -> Self {
        Self {
            nir_channel: 0,
            red_channel: 2,
        }
    }
}

impl BandMapping {
    fn check(&self, channels: usize) -> Result<()> {
        if self.nir_channel >= channels {
            return Err(VegetationError::ChannelOutOfRange {
                band: "NIR",
                index: self.nir_channel,
                channels,
            });
        }
        if self.red_channel >= channels {
            return Err(VegetationError::ChannelOutOfRange {
                band: "red",
                index: self.red_channel,
                channels,
            });
        }
        Ok(())
    }
}

/// Normalized difference of two band values with a denominator offset.
#[inline]
pub fn normalized_difference(nir: f64, red: f64, epsilon: f64) -> f64 {
    (nir - red) / (nir + red + epsilon)
}

/// Computes NDVI grids from decoded images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdviCalculator {
    bands: BandMapping,
    epsilon: f64,
}

impl Default for NdviCalculator {
    fn default() -> Self {
        Self {
            bands: BandMapping::default(),
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl NdviCalculator {
    pub fn new(bands: BandMapping, epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(VegetationError::InvalidEpsilon(epsilon));
        }
        if bands.nir_channel == bands.red_channel {
            return Err(VegetationError::SameChannel(bands.nir_channel));
        }
        Ok(Self { bands, epsilon })
    }

    pub fn bands(&self) -> BandMapping {
        self.bands
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Compute the index for every pixel of `image`.
    ///
    /// Rows are processed in parallel; each cell depends only on its own
    /// pixel, so the output is identical to a sequential pass.
    pub fn compute(&self, image: &PixelGrid) -> Result<NdviGrid> {
        self.bands.check(image.channels())?;

        let (width, height) = (image.width(), image.height());
        if image.is_empty() {
            return Ok(NdviGrid::from_parts(width, height, Vec::new()));
        }

        let channels = image.channels();
        let nir_ch = self.bands.nir_channel;
        let red_ch = self.bands.red_channel;
        let epsilon = self.epsilon;

        let values: Vec<f64> = image
            .data()
            .par_chunks(image.row_stride())
            .flat_map_iter(|row| {
                row.chunks_exact(channels).map(move |px| {
                    normalized_difference(f64::from(px[nir_ch]), f64::from(px[red_ch]), epsilon)
                })
            })
            .collect();

        debug!(width, height, "Computed NDVI grid");

        Ok(NdviGrid::from_parts(width, height, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_difference_zero_bands() {
        assert_eq!(normalized_difference(0.0, 0.0, DEFAULT_EPSILON), 0.0);
    }

    #[test]
    fn test_rejects_bad_epsilon() {
        assert_eq!(
            NdviCalculator::new(BandMapping::default(), 0.0),
            Err(VegetationError::InvalidEpsilon(0.0))
        );
        assert!(NdviCalculator::new(BandMapping::default(), f64::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_same_channel() {
        let bands = BandMapping {
            nir_channel: 1,
            red_channel: 1,
        };
        assert_eq!(
            NdviCalculator::new(bands, DEFAULT_EPSILON),
            Err(VegetationError::SameChannel(1))
        );
    }
}
