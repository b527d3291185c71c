//! vitrail-pipeline: stained glass mosaic engine (sans-IO).
//!
//! Turns a raster image into flat-colored polygons with dark outlines:
//! tile -> blur -> k-means per tile -> border tracing -> area filter ->
//! colorize -> paint.
//!
//! The interactive entry point is [`MosaicEngine`], which keeps a
//! two-tier cache so that changing a colorization-only setting skips
//! clustering and returning to an earlier configuration is free. For a
//! single render without caching use [`render_mosaic`].
//!
//! This crate has **no I/O dependencies**: it takes decoded images (or
//! encoded bytes via [`decode`]) and returns rasters. Reading and writing
//! files lives in the `vitrail` CLI.

pub mod area;
pub mod blur;
pub mod cache;
pub mod color;
pub mod colorize;
pub mod contour;
pub mod decode;
pub mod diagnostics;
pub mod engine;
pub mod extract;
pub mod fingerprint;
pub mod kmeans;
pub mod render;
pub mod settings;
pub mod tile;
pub mod types;

pub use cache::CacheConfig;
pub use decode::decode;
pub use diagnostics::{OperationReport, RenderDiagnostics, RenderOutcome};
pub use engine::{EngineConfig, EngineState, MosaicEngine, RenderListener};
pub use extract::{ClusterParams, extract_regions};
pub use fingerprint::Fingerprint;
pub use settings::{ColorScheme, Setting, SettingValue, Settings};
pub use types::{BorderKind, ConfigError, MosaicError, Point, Region, RgbImage};

/// Render one mosaic without an engine or cache.
///
/// # Pipeline steps
///
/// 1. Partition into a `Grid × Grid` set of tiles
/// 2. Box blur each tile
/// 3. k-means color clustering per tile
/// 4. Border tracing of every cluster
/// 5. MinArea / MaxArea filtering
/// 6. Fill, outline, and border painting
///
/// # Errors
///
/// Returns [`MosaicError::InvalidInput`] if the image is empty or the
/// settings cannot be applied to it.
pub fn render_mosaic(image: &RgbImage, settings: &Settings) -> Result<RgbImage, MosaicError> {
    let regions = extract_regions(image, &settings.cluster_params())?;
    Ok(colorize::colorize(&regions, image, settings)?.raster)
}
