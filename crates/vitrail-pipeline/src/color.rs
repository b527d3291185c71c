//! RGB / HSV conversion, saturation and lightness adjustment, and the
//! seeded random region color.
//!
//! All colors are in R, G, B channel order. Hue is in degrees `[0, 360)`;
//! saturation and value are in `[0, 1]`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::fingerprint::region_seed;
use crate::types::Point;

/// Color used for region outlines and the canvas border.
pub const OUTLINE_COLOR: [u8; 3] = [20, 20, 20];

/// A color in hue / saturation / value space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue in degrees, `[0, 360)`.
    pub h: f64,
    /// Saturation, `[0, 1]`.
    pub s: f64,
    /// Value, `[0, 1]`.
    pub v: f64,
}

impl Hsv {
    /// Multiply saturation and value by the given factors, clamping the
    /// results to `[0, 1]`. Hue is untouched.
    #[must_use]
    pub fn adjust(self, saturation: f64, lightness: f64) -> Self {
        Self {
            h: self.h,
            s: (self.s * saturation).clamp(0.0, 1.0),
            v: (self.v * lightness).clamp(0.0, 1.0),
        }
    }
}

/// Convert an 8-bit RGB color to HSV.
#[must_use]
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let [r, g, b] = rgb.map(|c| f64::from(c) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta <= 0.0 {
        0.0
    } else if (max - r).abs() < f64::EPSILON {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if (max - g).abs() < f64::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max <= 0.0 { 0.0 } else { delta / max };

    Hsv { h, s, v: max }
}

/// Convert HSV back to 8-bit RGB, rounding to the nearest level.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsv_to_rgb(hsv: Hsv) -> [u8; 3] {
    let h = hsv.h.rem_euclid(360.0);
    let s = hsv.s.clamp(0.0, 1.0);
    let v = hsv.v.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r, g, b].map(|ch| ((ch + m) * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Apply the saturation and lightness multipliers to an RGB color.
#[must_use]
pub fn adjust_rgb(rgb: [u8; 3], saturation: f64, lightness: f64) -> [u8; 3] {
    hsv_to_rgb(rgb_to_hsv(rgb).adjust(saturation, lightness))
}

/// Write an HSV color out directly as an 8-bit triple: hue halved to
/// `0..=180`, saturation and value scaled to `0..=255`.
///
/// Painting these bytes as if they were RGB gives the Pop scheme its
/// shifted, high-contrast palette.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsv_bytes(hsv: Hsv) -> [u8; 3] {
    let h = (hsv.h.rem_euclid(360.0) / 2.0).round();
    let s = (hsv.s.clamp(0.0, 1.0) * 255.0).round();
    let v = (hsv.v.clamp(0.0, 1.0) * 255.0).round();
    [h, s, v].map(|ch| ch.clamp(0.0, 255.0) as u8)
}

/// Pseudo-random HSV color for a region, seeded by its point sequence.
///
/// Hue is uniform in `[0, 360)`; saturation and value are uniform over
/// the levels `156..=255`, scaled to `[0, 1]`. The same points always
/// give the same color.
#[must_use]
pub fn random_region_hsv(points: &[Point]) -> Hsv {
    let mut rng = Pcg64Mcg::seed_from_u64(region_seed(points));
    let h = rng.gen_range(0.0..360.0);
    let s = f64::from(rng.gen_range(156_u8..=255)) / 255.0;
    let v = f64::from(rng.gen_range(156_u8..=255)) / 255.0;
    Hsv { h, s, v }
}
