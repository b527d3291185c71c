//! Boundary tracing of a single cluster's binary mask.
//!
//! Tracing uses Suzuki-Abe border following via
//! `imageproc::contours::find_contours`, which reports every border
//! pixel along with whether the border is an outer edge or the edge of a
//! hole. [`compress_runs`] then keeps only the corner points of each
//! border, so a straight horizontal, vertical, or diagonal run collapses
//! to its two ends.

use image::GrayImage;
use imageproc::contours::BorderType;

use crate::types::{BorderKind, Point};

/// One traced border in mask-local coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracedBorder {
    /// Corner points of the closed boundary.
    pub points: Vec<Point>,
    /// Outer border or hole border.
    pub border: BorderKind,
}

/// Trace every outer and hole border of the non-zero pixels in `mask`.
///
/// Borders are returned in tracing order, each compressed with
/// [`compress_runs`]. An all-zero mask yields no borders. Pixels on the
/// mask edge belong to outer borders like any other.
#[must_use]
pub fn trace_mask(mask: &GrayImage) -> Vec<TracedBorder> {
    // Border following only starts an outer border after a background
    // pixel, so components touching column 0 need a zero frame.
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);
    let contours: Vec<imageproc::contours::Contour<i32>> =
        imageproc::contours::find_contours(&padded);

    contours
        .into_iter()
        .filter(|c| !c.points.is_empty())
        .map(|c| {
            let points: Vec<Point> = c
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            TracedBorder {
                points: compress_runs(&points),
                border: match c.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                },
            }
        })
        .collect()
}

fn step(from: Point, to: Point) -> (i32, i32) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}

/// Drop every point that lies on a straight run between its neighbours.
///
/// The boundary is treated as closed, so the first and last points are
/// checked against each other too. Repeated points are merged first. A
/// point survives when the direction into it differs from the direction
/// out of it.
#[must_use]
pub fn compress_runs(points: &[Point]) -> Vec<Point> {
    let mut points = points.to_vec();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    let n = points.len();
    if n < 3 {
        return points;
    }

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let here = points[i];
            let next = points[(i + 1) % n];
            step(prev, here) != step(here, next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        vec![points[0]]
    } else {
        kept
    }
}
