//! Raster payload decoding.

use habitat_common::PixelGrid;

use crate::error::{ImageryError, Result};

/// Decode an encoded raster (PNG, JPEG, ...) into an interleaved 8-bit grid.
///
/// Images with an alpha channel keep it (4 channels); other colour images
/// become 3-channel RGB. Grayscale payloads are rejected because the
/// vegetation index needs two distinct bands.
pub fn decode_image(bytes: &[u8]) -> Result<PixelGrid> {
    let image = image::load_from_memory(bytes)?;
    let color = image.color();

    if color.channel_count() < 3 {
        return Err(ImageryError::decode(format!(
            "expected at least 3 channels, got {} ({:?})",
            color.channel_count(),
            color
        )));
    }

    let grid = if color.has_alpha() {
        let rgba = image.to_rgba8();
        let (w, h) = rgba.dimensions();
        PixelGrid::new(w as usize, h as usize, 4, rgba.into_raw())?
    } else {
        let rgb = image.to_rgb8();
        let (w, h) = rgb.dimensions();
        PixelGrid::new(w as usize, h as usize, 3, rgb.into_raw())?
    };

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_image(b"<html>not an image</html>").unwrap_err();
        assert!(matches!(err, ImageryError::Decode(_)));
    }

    #[test]
    fn test_empty_payload_is_decode_error() {
        assert!(matches!(decode_image(&[]), Err(ImageryError::Decode(_))));
    }
}
