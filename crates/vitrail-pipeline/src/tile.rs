//! G×G tiling of the source image.
//!
//! Tile size is `height / G` by `width / G` with floor division. Rows and
//! columns left over at the right and bottom edges belong to no tile, so
//! they are never clustered or traced (they only show the canvas
//! background). Every tile has the same size.

use crate::types::{MosaicError, RgbImage};

/// One cell of the grid partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Row-major index, `row * grid + col`.
    pub index: usize,
    /// Grid row.
    pub row: u32,
    /// Grid column.
    pub col: u32,
    /// Left edge in image pixels.
    pub x: u32,
    /// Top edge in image pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Tile {
    /// Pixel offset `(x, y)` of the tile's top-left corner.
    #[must_use]
    pub const fn offset(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Number of pixels in the tile.
    #[must_use]
    pub const fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Copy this tile's pixels out of `image`.
    #[must_use]
    pub fn crop(&self, image: &RgbImage) -> RgbImage {
        image::imageops::crop_imm(image, self.x, self.y, self.width, self.height).to_image()
    }
}

/// Split a `width × height` image into `grid × grid` equal tiles.
///
/// # Errors
///
/// Returns [`MosaicError::InvalidInput`] if `grid` is zero or the tiles
/// would be empty (the grid is larger than either image dimension).
pub fn partition(width: u32, height: u32, grid: u32) -> Result<Vec<Tile>, MosaicError> {
    if grid == 0 {
        return Err(MosaicError::InvalidInput(
            "tile grid size must be at least 1".to_string(),
        ));
    }
    let tile_w = width / grid;
    let tile_h = height / grid;
    if tile_w == 0 || tile_h == 0 {
        return Err(MosaicError::InvalidInput(format!(
            "a {grid}x{grid} grid leaves no pixels per tile in a {width}x{height} image",
        )));
    }

    let mut tiles = Vec::with_capacity(grid as usize * grid as usize);
    for row in 0..grid {
        for col in 0..grid {
            tiles.push(Tile {
                index: tiles.len(),
                row,
                col,
                x: col * tile_w,
                y: row * tile_h,
                width: tile_w,
                height: tile_h,
            });
        }
    }
    Ok(tiles)
}

/// Area of one tile in pixels, used as the reference for area
/// thresholds. Zero when the grid leaves empty tiles.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tile_area(width: u32, height: u32, grid: u32) -> f64 {
    if grid == 0 {
        return 0.0;
    }
    (u64::from(width / grid) * u64::from(height / grid)) as f64
}
