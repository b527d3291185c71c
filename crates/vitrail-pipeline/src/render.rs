//! Polygon rasterization with `tiny-skia`.
//!
//! Everything is drawn without anti-aliasing so a given set of regions
//! and colors always produces the same bytes. Polygon vertices are
//! integer pixel indices; paths run through pixel centers (`+ 0.5`).
//!
//! The same rasterizer builds the per-region masks used for the masked
//! mean color, so the pixels averaged for a region are exactly the pixels
//! its fill covers.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};
use tracing::warn;

use crate::types::{MosaicError, Point, RgbImage};

/// Radius of the square erosion applied to region masks (a 5×5 window).
pub const MASK_EROSION_RADIUS: u8 = 2;

#[allow(clippy::cast_precision_loss)]
fn center(p: Point, dx: i32, dy: i32) -> (f32, f32) {
    ((p.x - dx) as f32 + 0.5, (p.y - dy) as f32 + 0.5)
}

/// Closed path through the centers of `points`, shifted by `(-dx, -dy)`.
///
/// Returns `None` for fewer than two points.
fn polygon_path(points: &[Point], dx: i32, dy: i32) -> Option<Path> {
    if points.len() < 2 {
        return None;
    }
    let mut pb = PathBuilder::new();
    let (x, y) = center(points[0], dx, dy);
    pb.move_to(x, y);
    for &p in &points[1..] {
        let (x, y) = center(p, dx, dy);
        pb.line_to(x, y);
    }
    pb.close();
    pb.finish()
}

fn solid_paint(rgb: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], 255);
    paint.anti_alias = false;
    paint
}

#[allow(clippy::cast_precision_loss)]
fn outline_stroke(thickness: u32) -> Stroke {
    Stroke {
        width: thickness as f32,
        line_cap: LineCap::Square,
        line_join: LineJoin::Miter,
        ..Stroke::default()
    }
}

/// An opaque RGB drawing surface.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// A `width × height` canvas filled with `background`.
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::InvalidInput`] if either dimension is zero.
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Result<Self, MosaicError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            MosaicError::InvalidInput(format!("cannot allocate a {width}x{height} canvas"))
        })?;
        pixmap.fill(Color::from_rgba8(background[0], background[1], background[2], 255));
        Ok(Self { pixmap })
    }

    /// Fill the polygon with a solid color (non-zero winding).
    pub fn fill_polygon(&mut self, points: &[Point], rgb: [u8; 3]) {
        if let Some(path) = polygon_path(points, 0, 0) {
            self.pixmap.fill_path(
                &path,
                &solid_paint(rgb),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Stroke the polygon's closed boundary.
    pub fn stroke_polygon(&mut self, points: &[Point], rgb: [u8; 3], thickness: u32) {
        if let Some(path) = polygon_path(points, 0, 0) {
            self.pixmap.stroke_path(
                &path,
                &solid_paint(rgb),
                &outline_stroke(thickness),
                Transform::identity(),
                None,
            );
        }
    }

    /// Stroke a rectangle through the centers of the outermost pixels.
    pub fn stroke_border(&mut self, rgb: [u8; 3], thickness: u32) {
        let max_x = i32::try_from(self.pixmap.width()).unwrap_or(i32::MAX) - 1;
        let max_y = i32::try_from(self.pixmap.height()).unwrap_or(i32::MAX) - 1;
        let corners = [
            Point::new(0, 0),
            Point::new(max_x, 0),
            Point::new(max_x, max_y),
            Point::new(0, max_y),
        ];
        self.stroke_polygon(&corners, rgb, thickness);
    }

    /// Copy the canvas out as an RGB image.
    #[must_use]
    pub fn into_rgb_image(self) -> RgbImage {
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let pixels = self.pixmap.pixels();
        // Every pixel is opaque, so premultiplied and straight RGB agree.
        RgbImage::from_fn(width, height, |x, y| {
            let p = pixels[y as usize * width as usize + x as usize];
            image::Rgb([p.red(), p.green(), p.blue()])
        })
    }
}

/// Binary mask of a region, covering its bounding box plus a margin.
#[derive(Debug, Clone)]
pub struct RegionMask {
    /// Image-space position of the mask's top-left pixel.
    pub origin: (u32, u32),
    /// Non-zero where the region covers the pixel.
    pub mask: GrayImage,
}

impl RegionMask {
    /// Rasterize the filled polygon, boundary pixels included, clipped to
    /// a `width × height` image. Returns `None` when the region lies
    /// entirely outside the image.
    #[must_use]
    pub fn rasterize(points: &[Point], width: u32, height: u32) -> Option<Self> {
        let margin = i32::from(MASK_EROSION_RADIUS);
        let min_x = points.iter().map(|p| p.x).min()?;
        let min_y = points.iter().map(|p| p.y).min()?;
        let max_x = points.iter().map(|p| p.x).max()?;
        let max_y = points.iter().map(|p| p.y).max()?;

        let w = i32::try_from(width).ok()?;
        let h = i32::try_from(height).ok()?;
        let x0 = (min_x - margin).max(0);
        let y0 = (min_y - margin).max(0);
        let x1 = (max_x + margin).min(w - 1);
        let y1 = (max_y + margin).min(h - 1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        let mask_w = u32::try_from(x1 - x0 + 1).ok()?;
        let mask_h = u32::try_from(y1 - y0 + 1).ok()?;

        let mut pixmap = Pixmap::new(mask_w, mask_h)?;
        let paint = solid_paint([255, 255, 255]);
        if points.len() == 1 {
            let (px, py) = (points[0].x - x0, points[0].y - y0);
            if let (Ok(px), Ok(py)) = (usize::try_from(px), usize::try_from(py)) {
                let idx = py * mask_w as usize + px;
                if let Some(p) = pixmap.pixels_mut().get_mut(idx) {
                    *p = tiny_skia::PremultipliedColorU8::from_rgba(255, 255, 255, 255)?;
                }
            }
        } else if let Some(path) = polygon_path(points, x0, y0) {
            pixmap.fill_path(
                &path,
                &paint,
                FillRule::Winding,
                Transform::identity(),
                None,
            );
            pixmap.stroke_path(
                &path,
                &paint,
                &outline_stroke(1),
                Transform::identity(),
                None,
            );
        }

        let pixels = pixmap.pixels();
        let mask = GrayImage::from_fn(mask_w, mask_h, |x, y| {
            let covered = pixels[y as usize * mask_w as usize + x as usize].alpha() > 0;
            image::Luma([if covered { 255 } else { 0 }])
        });
        Some(Self {
            origin: (u32::try_from(x0).ok()?, u32::try_from(y0).ok()?),
            mask,
        })
    }

    /// The mask eroded by a 5×5 square.
    #[must_use]
    pub fn eroded(&self) -> Self {
        Self {
            origin: self.origin,
            mask: imageproc::morphology::erode(&self.mask, Norm::LInf, MASK_EROSION_RADIUS),
        }
    }

    /// Number of covered pixels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.mask.pixels().filter(|p| p.0[0] > 0).count()
    }

    /// Mean color of `image` over the covered pixels, or `None` if the
    /// mask is empty.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn mean_color(&self, image: &RgbImage) -> Option<[u8; 3]> {
        let (ox, oy) = self.origin;
        let mut sum = [0_u64; 3];
        let mut n = 0_u64;
        for (x, y, p) in self.mask.enumerate_pixels() {
            if p.0[0] == 0 {
                continue;
            }
            let Some(px) = image.get_pixel_checked(ox + x, oy + y) else {
                continue;
            };
            for c in 0..3 {
                sum[c] += u64::from(px.0[c]);
            }
            n += 1;
        }
        (n > 0).then(|| sum.map(|s| ((s + n / 2) / n) as u8))
    }
}

/// Mean color of the whole image, rounded per channel.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn global_mean(image: &RgbImage) -> [u8; 3] {
    let n = u64::from(image.width()) * u64::from(image.height());
    if n == 0 {
        return [0, 0, 0];
    }
    let mut sum = [0_u64; 3];
    for p in image.pixels() {
        for c in 0..3 {
            sum[c] += u64::from(p.0[c]);
        }
    }
    sum.map(|s| ((s + n / 2) / n) as u8)
}

/// Representative color of a region: the mean over its eroded mask.
///
/// When erosion leaves nothing, the uneroded mask is used; when even that
/// is empty, the color of the first boundary pixel.
#[must_use]
pub fn region_mean(points: &[Point], image: &RgbImage) -> [u8; 3] {
    let (width, height) = image.dimensions();
    let mask = RegionMask::rasterize(points, width, height);

    if let Some(mask) = &mask {
        if let Some(rgb) = mask.eroded().mean_color(image) {
            return rgb;
        }
        warn!(
            points = points.len(),
            pixels = mask.count(),
            "region mask empty after erosion, using uneroded mask",
        );
        if let Some(rgb) = mask.mean_color(image) {
            return rgb;
        }
    }

    points
        .first()
        .and_then(|p| {
            let x = u32::try_from(p.x).ok()?;
            let y = u32::try_from(p.y).ok()?;
            image.get_pixel_checked(x, y)
        })
        .map_or([0, 0, 0], |p| p.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn canvas_starts_with_background() {
        let canvas = Canvas::new(3, 2, [1, 2, 3]).unwrap();
        let img = canvas.into_rgb_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert!(img.pixels().all(|p| p.0 == [1, 2, 3]));
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(Canvas::new(0, 4, [0, 0, 0]).is_err());
    }

    #[test]
    fn fill_covers_interior() {
        let mut canvas = Canvas::new(10, 10, [0, 0, 0]).unwrap();
        canvas.fill_polygon(&rect(2, 2, 7, 7), [255, 0, 0]);
        let img = canvas.into_rgb_image();
        assert_eq!(img.get_pixel(4, 4).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(9, 9).0, [0, 0, 0]);
    }

    #[test]
    fn stroke_covers_boundary_pixels() {
        let mut canvas = Canvas::new(10, 10, [255, 255, 255]).unwrap();
        canvas.stroke_polygon(&rect(2, 2, 7, 7), [20, 20, 20], 1);
        let img = canvas.into_rgb_image();
        assert_eq!(img.get_pixel(4, 2).0, [20, 20, 20]);
        assert_eq!(img.get_pixel(2, 5).0, [20, 20, 20]);
        assert_eq!(img.get_pixel(4, 4).0, [255, 255, 255]);
    }

    #[test]
    fn border_touches_every_edge() {
        let mut canvas = Canvas::new(8, 6, [255, 255, 255]).unwrap();
        canvas.stroke_border([20, 20, 20], 1);
        let img = canvas.into_rgb_image();
        assert_eq!(img.get_pixel(4, 0).0, [20, 20, 20]);
        assert_eq!(img.get_pixel(4, 5).0, [20, 20, 20]);
        assert_eq!(img.get_pixel(0, 3).0, [20, 20, 20]);
        assert_eq!(img.get_pixel(7, 3).0, [20, 20, 20]);
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255]);
    }

    #[test]
    fn rendering_is_repeatable() {
        let draw = || {
            let mut canvas = Canvas::new(16, 16, [9, 9, 9]).unwrap();
            let tri = [Point::new(1, 1), Point::new(14, 3), Point::new(5, 13)];
            canvas.fill_polygon(&tri, [200, 100, 50]);
            canvas.stroke_polygon(&tri, [20, 20, 20], 2);
            canvas.into_rgb_image()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn mask_includes_boundary() {
        let mask = RegionMask::rasterize(&rect(3, 3, 6, 6), 20, 20).unwrap();
        assert_eq!(mask.origin, (1, 1));
        assert_eq!(mask.count(), 16);
    }

    #[test]
    fn mask_is_clipped_to_image() {
        let mask = RegionMask::rasterize(&rect(0, 0, 3, 3), 4, 4).unwrap();
        assert_eq!(mask.origin, (0, 0));
        assert_eq!(mask.mask.dimensions(), (4, 4));
        assert_eq!(mask.count(), 16);
    }

    #[test]
    fn erosion_shrinks_mask() {
        let mask = RegionMask::rasterize(&rect(2, 2, 11, 11), 20, 20).unwrap();
        let eroded = mask.eroded();
        // 10x10 square eroded by 2 on each side leaves 6x6.
        assert_eq!(eroded.count(), 36);
    }

    #[test]
    fn masked_mean_ignores_outside_pixels() {
        let image = RgbImage::from_fn(20, 20, |x, _| {
            if x < 10 {
                image::Rgb([200, 0, 0])
            } else {
                image::Rgb([0, 0, 200])
            }
        });
        assert_eq!(region_mean(&rect(0, 0, 9, 19), &image), [200, 0, 0]);
        assert_eq!(region_mean(&rect(10, 0, 19, 19), &image), [0, 0, 200]);
    }

    #[test]
    fn thin_region_falls_back_to_uneroded_mask() {
        let image = RgbImage::from_fn(10, 10, |_, y| {
            if y == 4 {
                image::Rgb([10, 250, 10])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        // A one-pixel-tall strip vanishes under a 5x5 erosion.
        let strip = [Point::new(2, 4), Point::new(7, 4)];
        assert_eq!(region_mean(&strip, &image), [10, 250, 10]);
    }

    #[test]
    fn global_mean_rounds() {
        let image = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgb([0, 10, 255])
            } else {
                image::Rgb([1, 11, 0])
            }
        });
        assert_eq!(global_mean(&image), [1, 11, 128]);
    }
}
