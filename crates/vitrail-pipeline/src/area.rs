//! Polygon area and the MinArea / MaxArea region filter.
//!
//! Both thresholds are percentages of one tile's area, not of the whole
//! image. A region survives when `min < area <= max`.

use crate::settings::Settings;
use crate::tile::tile_area;
use crate::types::{Point, Region};

/// Magnitude of the shoelace signed area of a closed polygon.
///
/// Fewer than three points enclose nothing and give zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    twice.unsigned_abs() as f64 / 2.0
}

/// Absolute area bounds derived from the percentage settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaThresholds {
    /// Regions at or below this area are dropped.
    pub min: f64,
    /// Regions above this area are dropped.
    pub max: f64,
}

impl AreaThresholds {
    /// Thresholds from percentages of a reference area.
    #[must_use]
    pub fn from_percentages(min_percent: f64, max_percent: f64, reference: f64) -> Self {
        Self {
            min: min_percent / 100.0 * reference,
            max: max_percent / 100.0 * reference,
        }
    }

    /// Thresholds for a `width × height` image under `settings`, relative
    /// to the area of one grid tile.
    #[must_use]
    pub fn for_image(settings: &Settings, width: u32, height: u32) -> Self {
        Self::from_percentages(
            settings.min_area(),
            settings.max_area(),
            tile_area(width, height, settings.grid()),
        )
    }

    /// Whether `area` passes: strictly above `min`, at most `max`.
    #[must_use]
    pub fn contains(&self, area: f64) -> bool {
        self.min < area && area <= self.max
    }
}

/// The regions whose area passes `thresholds`, in their original order.
pub fn filter_regions<'a>(
    regions: &'a [Region],
    thresholds: &AreaThresholds,
) -> impl Iterator<Item = &'a Region> {
    let thresholds = *thresholds;
    regions
        .iter()
        .filter(move |r| thresholds.contains(polygon_area(r.points())))
}
