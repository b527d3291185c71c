//! Image decoding for collaborators that hold encoded bytes.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the RGB
//! raster the engine works on. Alpha is discarded.

use crate::types::{MosaicError, RgbImage};

/// Decode raw image bytes into an RGB image.
///
/// # Errors
///
/// Returns [`MosaicError::EmptyInput`] if `bytes` is empty.
/// Returns [`MosaicError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, MosaicError> {
    if bytes.is_empty() {
        return Err(MosaicError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode(&[]), Err(MosaicError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(MosaicError::ImageDecode(_))));
    }

    #[test]
    fn png_decodes_with_channel_order_intact() {
        let img = image::RgbaImage::from_fn(3, 2, |x, _| {
            if x == 0 {
                image::Rgba([250, 10, 20, 255])
            } else {
                image::Rgba([5, 6, 240, 128])
            }
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();

        let rgb = decode(&buf).unwrap();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(0, 1).0, [250, 10, 20]);
        assert_eq!(rgb.get_pixel(2, 0).0, [5, 6, 240]);
    }
}
