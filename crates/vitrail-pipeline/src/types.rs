//! Shared types for the vitrail mosaic engine.

use serde::{Deserialize, Serialize};

use crate::settings::{Setting, SettingValue};

/// Re-export `RgbImage` so downstream crates can hand rasters to the
/// engine without depending on `image` directly.
///
/// Channel order is always R, G, B. Every color-space conversion in this
/// crate assumes that order.
pub use image::RgbImage;

/// A 2D point in full-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column (pixels from left edge).
    pub x: i32,
    /// Row (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return this point shifted by `(dx, dy)`.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Whether a traced border surrounds a foreground component or a hole
/// inside one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorderKind {
    /// Outer border of a connected foreground component.
    Outer,
    /// Border of a hole inside a foreground component.
    Hole,
}

/// A closed polygon produced by the extractor.
///
/// Points are already in full-image coordinates; the tile offset that
/// produced them is kept for reference only. Regions have no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    points: Vec<Point>,
    tile_index: usize,
    tile_offset: (u32, u32),
    label: usize,
    border: BorderKind,
}

impl Region {
    /// Create a region from tile-local points, translating them into
    /// full-image space by `tile_offset`.
    #[must_use]
    pub fn from_tile_points(
        local: impl IntoIterator<Item = Point>,
        tile_index: usize,
        tile_offset: (u32, u32),
        label: usize,
        border: BorderKind,
    ) -> Self {
        let dx = i32::try_from(tile_offset.0).unwrap_or(i32::MAX);
        let dy = i32::try_from(tile_offset.1).unwrap_or(i32::MAX);
        Self {
            points: local.into_iter().map(|p| p.translate(dx, dy)).collect(),
            tile_index,
            tile_offset,
            label,
            border,
        }
    }

    /// The closed boundary, in full-image coordinates.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Row-major index of the tile that produced this region.
    #[must_use]
    pub const fn tile_index(&self) -> usize {
        self.tile_index
    }

    /// Pixel offset `(x, y)` of the producing tile.
    #[must_use]
    pub const fn tile_offset(&self) -> (u32, u32) {
        self.tile_offset
    }

    /// Cluster label within the producing tile.
    #[must_use]
    pub const fn label(&self) -> usize {
        self.label
    }

    /// Outer border or hole border.
    #[must_use]
    pub const fn border(&self) -> BorderKind {
        self.border
    }

    /// Number of boundary points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the region has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Errors raised by the configuration store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The setting name is not part of the schema.
    #[error("unknown setting: {0:?}")]
    UnknownSetting(String),

    /// The value has the wrong shape for the setting.
    #[error("setting {setting} expects {expected}, got {found}")]
    TypeMismatch {
        /// Setting being assigned.
        setting: Setting,
        /// Human-readable description of the accepted type.
        expected: &'static str,
        /// The rejected value.
        found: SettingValue,
    },

    /// The value has the right shape but is out of range.
    #[error("invalid value for {setting}: {reason}")]
    InvalidValue {
        /// Setting being assigned.
        setting: Setting,
        /// Why the value was rejected.
        reason: String,
    },

    /// A textual value could not be parsed.
    #[error("cannot parse setting value: {0:?}")]
    UnparseableValue(String),
}

/// Errors that can occur while rendering a mosaic.
#[derive(Debug, thiserror::Error)]
pub enum MosaicError {
    /// A setting name or value was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The image or the clustering parameters cannot produce a mosaic.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
}
