//! PNG output for retrieved imagery and computed NDVI grids.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use habitat_common::DATE_FORMAT;
use image::{GrayImage, RgbImage, RgbaImage};
use imagery::ImageSample;
use tracing::debug;
use vegetation::NdviGrid;

/// Writes per-date PNG files into one directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Create the output directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("nasa_image_{}.png", date.format(DATE_FORMAT)))
    }

    pub fn ndvi_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("ndvi_{}.png", date.format(DATE_FORMAT)))
    }

    /// Save the retrieved image as RGB or RGBA, matching its channel count.
    pub fn save_sample(&self, sample: &ImageSample) -> Result<PathBuf> {
        let path = self.image_path(sample.date);
        let grid = &sample.pixels;
        let (width, height) = (grid.width() as u32, grid.height() as u32);

        match grid.channels() {
            3 => RgbImage::from_raw(width, height, grid.data().to_vec())
                .context("RGB buffer does not match image dimensions")?
                .save(&path),
            4 => RgbaImage::from_raw(width, height, grid.data().to_vec())
                .context("RGBA buffer does not match image dimensions")?
                .save(&path),
            n => anyhow::bail!("Cannot write image with {} channels", n),
        }
        .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(path = %path.display(), "Saved image");
        Ok(path)
    }

    /// Save an NDVI grid as 8-bit grayscale.
    pub fn save_ndvi(&self, date: NaiveDate, ndvi: &NdviGrid) -> Result<PathBuf> {
        let path = self.ndvi_path(date);

        GrayImage::from_raw(ndvi.width() as u32, ndvi.height() as u32, ndvi.to_gray8())
            .context("NDVI buffer does not match grid dimensions")?
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!(path = %path.display(), "Saved NDVI raster");
        Ok(path)
    }
}
