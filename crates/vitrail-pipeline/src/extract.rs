//! Clustering and contour extraction.
//!
//! The image is split into a G×G grid. Each tile is blurred, its pixels
//! are clustered with k-means, and the border of every cluster is traced.
//! The result is the list of closed regions, already translated into
//! full-image coordinates.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blur::{box_blur_rgb, validate_kernel};
use crate::contour::trace_mask;
use crate::kmeans::{KMeansParams, Sample, kmeans};
use crate::tile::{Tile, partition};
use crate::types::{MosaicError, Region, RgbImage};

/// Base seed for per-tile clustering. Each tile mixes in its own index.
pub const CLUSTER_BASE_SEED: u64 = 0x5eed_6b6d_6561_6e73;

/// The settings that determine the traced regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Clusters per tile.
    pub k: u32,
    /// Tiles per side.
    pub grid: u32,
    /// Box-blur kernel size (odd).
    pub blur_size: u32,
}

impl ClusterParams {
    /// Check these parameters against an image size and lay out the
    /// tiles they produce.
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::InvalidInput`] when the image is empty, `k`
    /// is zero, the blur kernel is even, the grid leaves empty tiles, or
    /// a tile has fewer pixels than `k`.
    pub fn tiles(&self, width: u32, height: u32) -> Result<Vec<Tile>, MosaicError> {
        if width == 0 || height == 0 {
            return Err(MosaicError::InvalidInput(format!(
                "image must be non-empty, got {width}x{height}",
            )));
        }
        if self.k == 0 {
            return Err(MosaicError::InvalidInput(
                "cluster count must be at least 1".to_string(),
            ));
        }
        validate_kernel(self.blur_size)?;
        let tiles = partition(width, height, self.grid)?;
        let pixels = tiles.first().map_or(0, Tile::pixel_count);
        if u64::from(self.k) > pixels {
            return Err(MosaicError::InvalidInput(format!(
                "cannot form {} clusters in a tile of {pixels} pixels",
                self.k,
            )));
        }
        Ok(tiles)
    }
}

/// Seed for one tile's k-means run.
#[must_use]
pub const fn tile_seed(tile_index: usize) -> u64 {
    CLUSTER_BASE_SEED ^ (tile_index as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

/// Cluster every tile and trace the borders of each cluster.
///
/// Regions are ordered by tile (row-major), then label, then tracing
/// order within the label's mask.
///
/// # Errors
///
/// Returns [`MosaicError::InvalidInput`] if the parameters cannot be
/// applied to this image (see [`ClusterParams::tiles`]).
pub fn extract_regions(
    image: &RgbImage,
    params: &ClusterParams,
) -> Result<Vec<Region>, MosaicError> {
    let tiles = params.tiles(image.width(), image.height())?;
    let k = params.k as usize;

    let mut regions = Vec::new();
    for tile in &tiles {
        let blurred = box_blur_rgb(&tile.crop(image), params.blur_size);
        let samples: Vec<Sample> = blurred.pixels().map(|p| p.0.map(f32::from)).collect();
        let clustering = kmeans(&samples, &KMeansParams::new(k, tile_seed(tile.index)))?;

        let before = regions.len();
        let mut used = vec![false; k];
        for &label in &clustering.labels {
            used[label] = true;
        }
        for label in (0..k).filter(|&l| used[l]) {
            let mask = label_mask(&clustering.labels, label, tile.width, tile.height);
            regions.extend(trace_mask(&mask).into_iter().map(|traced| {
                Region::from_tile_points(
                    traced.points,
                    tile.index,
                    tile.offset(),
                    label,
                    traced.border,
                )
            }));
        }

        debug!(
            tile = tile.index,
            row = tile.row,
            col = tile.col,
            inertia = clustering.inertia,
            regions = regions.len() - before,
            "clustered tile",
        );
    }
    Ok(regions)
}

/// Binary mask of the pixels carrying `label`, in row-major label order.
fn label_mask(labels: &[usize], label: usize, width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let i = y as usize * width as usize + x as usize;
        image::Luma([if labels[i] == label { 255 } else { 0 }])
    })
}
