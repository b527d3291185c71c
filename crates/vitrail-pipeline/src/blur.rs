//! Box blur for quantization-noise reduction before clustering.
//!
//! Wraps [`imageproc::filter::box_filter`], which only accepts
//! `GrayImage`, by splitting the RGB tile into three channels, filtering
//! each, and reassembling. Pixels beyond the tile edge are treated as
//! copies of the nearest edge pixel.

use image::GrayImage;

use crate::types::{MosaicError, RgbImage};

/// Check that `kernel_size` is a usable box-blur kernel.
///
/// # Errors
///
/// Returns [`MosaicError::InvalidInput`] unless the size is odd and at
/// least 1.
pub fn validate_kernel(kernel_size: u32) -> Result<(), MosaicError> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(MosaicError::InvalidInput(format!(
            "blur kernel size must be a positive odd number, got {kernel_size}",
        )));
    }
    Ok(())
}

/// Apply a `kernel_size × kernel_size` mean filter to each channel.
///
/// A kernel size of 1 returns the image unchanged. Callers are expected
/// to have passed the size through [`validate_kernel`]; even sizes round
/// down to the next odd size.
#[must_use = "returns the blurred image"]
pub fn box_blur_rgb(image: &RgbImage, kernel_size: u32) -> RgbImage {
    let radius = kernel_size.saturating_sub(1) / 2;
    if radius == 0 {
        return image.clone();
    }

    let (w, h) = image.dimensions();

    let channels: [GrayImage; 3] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]))
    });

    let blurred: [GrayImage; 3] =
        std::array::from_fn(|c| imageproc::filter::box_filter(&channels[c], radius, radius));

    RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            blurred[0].get_pixel(x, y).0[0],
            blurred[1].get_pixel(x, y).0[0],
            blurred[2].get_pixel(x, y).0[0],
        ])
    })
}
