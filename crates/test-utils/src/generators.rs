//! Test data generators for synthetic imagery.
//!
//! These generators create predictable, verifiable pixel patterns
//! that can be used across the test suite.

use std::io::Cursor;

use bytes::Bytes;
use habitat_common::PixelGrid;
use image::{DynamicImage, GrayImage, ImageOutputFormat, RgbImage, RgbaImage};

/// Creates a 3-channel grid where every pixel is `[nir, 0, red]`.
///
/// Channel 0 carries the near-infrared proxy and channel 2 the red proxy,
/// matching the default band mapping.
///
/// # Example
///
/// ```
/// use test_utils::create_band_grid;
///
/// let grid = create_band_grid(4, 2, 200, 50);
/// assert_eq!(grid.pixel(1, 3), Some(&[200u8, 0, 50][..]));
/// ```
pub fn create_band_grid(width: usize, height: usize, nir: u8, red: u8) -> PixelGrid {
    let mut data = Vec::with_capacity(width * height * 3);
    for _ in 0..width * height {
        data.extend_from_slice(&[nir, 0, red]);
    }
    PixelGrid::new(width, height, 3, data).expect("band grid dimensions are consistent")
}

/// Creates a grid with deterministic pseudo-random samples in every channel.
///
/// The same `(width, height, channels, seed)` always produces the same grid.
pub fn create_hashed_grid(width: usize, height: usize, channels: usize, seed: u32) -> PixelGrid {
    let mut data = Vec::with_capacity(width * height * channels);
    for row in 0..height {
        for col in 0..width {
            for ch in 0..channels {
                let hash = simple_hash(col as u32, row as u32, seed.wrapping_add(ch as u32));
                data.push((hash % 256) as u8);
            }
        }
    }
    PixelGrid::new(width, height, channels, data).expect("hashed grid dimensions are consistent")
}

/// Creates a 3-channel grid whose NIR channel ramps left to right and red
/// channel ramps top to bottom, so every NDVI sign appears somewhere.
pub fn create_gradient_grid(width: usize, height: usize) -> PixelGrid {
    let mut data = Vec::with_capacity(width * height * 3);
    for row in 0..height {
        for col in 0..width {
            let nir = (col * 255 / width.max(2).saturating_sub(1).max(1)).min(255) as u8;
            let red = (row * 255 / height.max(2).saturating_sub(1).max(1)).min(255) as u8;
            data.extend_from_slice(&[nir, 128, red]);
        }
    }
    PixelGrid::new(width, height, 3, data).expect("gradient grid dimensions are consistent")
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Encodes a 3- or 4-channel grid as an in-memory PNG, the payload an
/// imagery provider would return.
pub fn encode_png(grid: &PixelGrid) -> Bytes {
    let (w, h) = (grid.width() as u32, grid.height() as u32);
    let image = match grid.channels() {
        3 => DynamicImage::ImageRgb8(
            RgbImage::from_raw(w, h, grid.data().to_vec()).expect("rgb buffer size"),
        ),
        4 => DynamicImage::ImageRgba8(
            RgbaImage::from_raw(w, h, grid.data().to_vec()).expect("rgba buffer size"),
        ),
        n => panic!("encode_png supports 3 or 4 channels, got {}", n),
    };
    write_png(&image)
}

/// Encodes a single-channel grayscale PNG of the given size.
pub fn encode_gray_png(width: u32, height: u32, value: u8) -> Bytes {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, image::Luma([value])));
    write_png(&image)
}

fn write_png(image: &DynamicImage) -> Bytes {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageOutputFormat::Png)
        .expect("PNG encoding to memory");
    Bytes::from(buf.into_inner())
}
