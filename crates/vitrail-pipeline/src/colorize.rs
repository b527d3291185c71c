//! Region filtering, color selection, and painting.
//!
//! Given the traced regions, the source image, and the full settings,
//! produce the final mosaic raster:
//!
//! 1. drop regions outside the MinArea / MaxArea window,
//! 2. pick each kept region's color according to the color scheme,
//! 3. fill every kept region in list order, then outline every kept
//!    region and the canvas border.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::area::{AreaThresholds, filter_regions};
use crate::color::{
    OUTLINE_COLOR, adjust_rgb, hsv_bytes, hsv_to_rgb, random_region_hsv, rgb_to_hsv,
};
use crate::render::{Canvas, global_mean, region_mean};
use crate::settings::{ColorScheme, Settings};
use crate::types::{MosaicError, Region, RgbImage};

/// Region counts from one colorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionCounts {
    /// Regions handed to the colorizer.
    pub traced: usize,
    /// Regions that passed the area filter and were painted.
    pub kept: usize,
}

/// A rendered mosaic and the region counts that produced it.
#[derive(Debug, Clone)]
pub struct Colorized {
    /// The painted raster, same size as the source image.
    pub raster: RgbImage,
    /// Traced and kept region counts.
    pub counts: RegionCounts,
}

/// Fill color of one region under the active scheme.
#[must_use]
pub fn region_color(region: &Region, image: &RgbImage, settings: &Settings) -> [u8; 3] {
    let (saturation, lightness) = (settings.saturation(), settings.lightness());
    match settings.color_scheme() {
        ColorScheme::Original => adjust_rgb(region_mean(region.points(), image), saturation, lightness),
        ColorScheme::Pop => hsv_bytes(rgb_to_hsv(region_mean(region.points(), image))),
        ColorScheme::Random => {
            hsv_to_rgb(random_region_hsv(region.points()).adjust(saturation, lightness))
        }
    }
}

/// Canvas background: the global mean color, treated the same way the
/// active scheme treats a region mean.
#[must_use]
pub fn background_color(image: &RgbImage, settings: &Settings) -> [u8; 3] {
    let mean = global_mean(image);
    match settings.color_scheme() {
        ColorScheme::Pop => hsv_bytes(rgb_to_hsv(mean)),
        ColorScheme::Original | ColorScheme::Random => {
            adjust_rgb(mean, settings.saturation(), settings.lightness())
        }
    }
}

/// Paint the mosaic for `regions` over `image` under `settings`.
///
/// # Errors
///
/// Returns [`MosaicError::InvalidInput`] if the image is empty.
pub fn colorize(
    regions: &[Region],
    image: &RgbImage,
    settings: &Settings,
) -> Result<Colorized, MosaicError> {
    let (width, height) = image.dimensions();
    let thresholds = AreaThresholds::for_image(settings, width, height);
    let kept: Vec<&Region> = filter_regions(regions, &thresholds).collect();

    let mut canvas = Canvas::new(width, height, background_color(image, settings))?;
    for region in &kept {
        canvas.fill_polygon(region.points(), region_color(region, image, settings));
    }

    let thickness = settings.line_thickness();
    for region in &kept {
        canvas.stroke_polygon(region.points(), OUTLINE_COLOR, thickness);
    }
    canvas.stroke_border(OUTLINE_COLOR, thickness);

    let counts = RegionCounts {
        traced: regions.len(),
        kept: kept.len(),
    };
    debug!(
        traced = counts.traced,
        kept = counts.kept,
        min_area = thresholds.min,
        max_area = thresholds.max,
        scheme = %settings.color_scheme(),
        "colorized regions",
    );

    Ok(Colorized {
        raster: canvas.into_rgb_image(),
        counts,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::settings::{Setting, SettingValue};
    use crate::types::{BorderKind, Point};

    const RED: [u8; 3] = [200, 30, 30];
    const BLUE: [u8; 3] = [30, 30, 200];

    fn halves() -> RgbImage {
        RgbImage::from_fn(40, 20, |x, _| {
            if x < 20 { image::Rgb(RED) } else { image::Rgb(BLUE) }
        })
    }

    fn rect_region(x0: i32, y0: i32, x1: i32, y1: i32) -> Region {
        Region::from_tile_points(
            [
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
            ],
            0,
            (0, 0),
            0,
            BorderKind::Outer,
        )
    }

    fn settings_with(pairs: &[(Setting, SettingValue)]) -> Settings {
        let mut s = Settings::default();
        for &(setting, value) in pairs {
            s.set(setting, value).unwrap();
        }
        s
    }

    fn open_settings(scheme: ColorScheme) -> Settings {
        settings_with(&[
            (Setting::Grid, SettingValue::Integer(1)),
            (Setting::MinArea, SettingValue::Float(0.0)),
            (Setting::MaxArea, SettingValue::Float(100.0)),
            (Setting::ColorScheme, SettingValue::Scheme(scheme)),
        ])
    }

    #[test]
    fn original_scheme_paints_region_means() {
        let image = halves();
        let regions = [rect_region(0, 0, 19, 19), rect_region(20, 0, 39, 19)];
        let out = colorize(&regions, &image, &open_settings(ColorScheme::Original)).unwrap();
        assert_eq!(out.counts, RegionCounts { traced: 2, kept: 2 });
        assert_eq!(out.raster.get_pixel(10, 10).0, RED);
        assert_eq!(out.raster.get_pixel(30, 10).0, BLUE);
    }

    #[test]
    fn outlines_use_outline_color() {
        let image = halves();
        let regions = [rect_region(0, 0, 19, 19), rect_region(20, 0, 39, 19)];
        let out = colorize(&regions, &image, &open_settings(ColorScheme::Pop)).unwrap();
        assert_eq!(out.raster.get_pixel(19, 10).0, OUTLINE_COLOR);
        assert_eq!(out.raster.get_pixel(0, 0).0, OUTLINE_COLOR);
    }

    #[test]
    fn saturation_applies_to_original_but_not_pop() {
        let image = halves();
        let regions = [rect_region(0, 0, 19, 19)];
        let desaturate = |scheme| {
            settings_with(&[
                (Setting::Grid, SettingValue::Integer(1)),
                (Setting::MinArea, SettingValue::Float(0.0)),
                (Setting::Saturation, SettingValue::Float(0.0)),
                (Setting::ColorScheme, SettingValue::Scheme(scheme)),
            ])
        };
        let original = colorize(&regions, &image, &desaturate(ColorScheme::Original)).unwrap();
        assert_eq!(original.raster.get_pixel(10, 10).0, [200, 200, 200]);
        let pop = colorize(&regions, &image, &desaturate(ColorScheme::Pop)).unwrap();
        assert_eq!(pop.raster.get_pixel(10, 10).0, [0, 217, 200]);
    }

    #[test]
    fn pop_differs_from_original_at_defaults() {
        let image = halves();
        let regions = [rect_region(0, 0, 19, 19), rect_region(20, 0, 39, 19)];
        let original = colorize(&regions, &image, &open_settings(ColorScheme::Original)).unwrap();
        let pop = colorize(&regions, &image, &open_settings(ColorScheme::Pop)).unwrap();
        assert_ne!(original.raster, pop.raster);
        assert_eq!(pop.raster.get_pixel(10, 10).0, [0, 217, 200]);
        assert_eq!(pop.raster.get_pixel(30, 10).0, [120, 217, 200]);
    }

    #[test]
    fn random_scheme_is_repeatable() {
        let image = halves();
        let regions = [rect_region(0, 0, 19, 19), rect_region(20, 0, 39, 19)];
        let settings = open_settings(ColorScheme::Random);
        let a = colorize(&regions, &image, &settings).unwrap();
        let b = colorize(&regions, &image, &settings).unwrap();
        assert_eq!(a.raster, b.raster);
        let expected = hsv_to_rgb(random_region_hsv(regions[0].points()));
        assert_eq!(a.raster.get_pixel(10, 10).0, expected);
    }

    #[test]
    fn filtered_regions_are_not_painted() {
        let image = halves();
        // 2x2 px square has area 1.0; 5% of 800 px is 40.
        let regions = [rect_region(20, 5, 21, 6)];
        let settings = settings_with(&[
            (Setting::Grid, SettingValue::Integer(1)),
            (Setting::MinArea, SettingValue::Float(5.0)),
            (Setting::ColorScheme, SettingValue::Scheme(ColorScheme::Pop)),
        ]);
        let out = colorize(&regions, &image, &settings).unwrap();
        assert_eq!(out.counts, RegionCounts { traced: 1, kept: 0 });
        // Only background and border remain.
        assert_eq!(out.raster.get_pixel(20, 5).0, background_color(&image, &settings));
    }

    #[test]
    fn background_is_global_mean() {
        let image = halves();
        let out = colorize(&[], &image, &open_settings(ColorScheme::Original)).unwrap();
        assert_eq!(out.raster.get_pixel(10, 10).0, [115, 30, 115]);
        assert_eq!(global_mean(&image), [115, 30, 115]);
    }

    #[test]
    fn pop_background_is_hsv_encoded() {
        let image = halves();
        let out = colorize(&[], &image, &open_settings(ColorScheme::Pop)).unwrap();
        assert_eq!(out.raster.get_pixel(10, 10).0, [150, 188, 115]);
    }

    #[test]
    fn holes_overwrite_parents() {
        let image = RgbImage::from_fn(20, 20, |x, y| {
            if (6..14).contains(&x) && (6..14).contains(&y) {
                image::Rgb(BLUE)
            } else {
                image::Rgb(RED)
            }
        });
        let outer = rect_region(0, 0, 19, 19);
        let inner = rect_region(6, 6, 13, 13);
        let settings = settings_with(&[
            (Setting::Grid, SettingValue::Integer(1)),
            (Setting::MinArea, SettingValue::Float(0.0)),
            (Setting::LineThickness, SettingValue::Integer(1)),
        ]);
        let out = colorize(&[outer, inner], &image, &settings).unwrap();
        assert_eq!(out.raster.get_pixel(10, 10).0, BLUE);
    }
}
