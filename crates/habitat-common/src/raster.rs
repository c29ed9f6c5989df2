//! Decoded raster pixel grids.

use crate::error::{HabitatError, HabitatResult};

/// A row-major grid of 8-bit pixels with interleaved channels.
///
/// Pixel `(row, col)` occupies `data[(row * width + col) * channels..][..channels]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Wrap raw interleaved samples, checking the buffer matches the dimensions.
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> HabitatResult<Self> {
        if channels == 0 {
            return Err(HabitatError::invalid_raster("channel count must be > 0"));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| HabitatError::invalid_raster("dimensions overflow"))?;
        if data.len() != expected {
            return Err(HabitatError::invalid_raster(format!(
                "expected {} samples for {}x{}x{}, got {}",
                expected,
                width,
                height,
                channels,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw interleaved samples.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of samples in one row.
    pub fn row_stride(&self) -> usize {
        self.width * self.channels
    }

    /// All channel values of one pixel.
    pub fn pixel(&self, row: usize, col: usize) -> Option<&[u8]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let start = (row * self.width + col) * self.channels;
        Some(&self.data[start..start + self.channels])
    }
}
