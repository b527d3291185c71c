//! Two-tier render cache.
//!
//! - The **full** tier maps a whole-settings [`Fingerprint`] to a finished
//!   raster, so returning to an earlier configuration is free.
//! - The **contour** tier maps a clustering-only fingerprint to the traced
//!   regions, so colorization-only changes skip k-means and tracing.
//!
//! Each tier is a fixed-capacity LRU. Both are cleared together when the
//! source image changes.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::types::{Region, RgbImage};

/// Default number of finished rasters kept.
pub const DEFAULT_FULL_CAPACITY: usize = 32;

/// Default number of traced region sets kept.
pub const DEFAULT_CONTOUR_CAPACITY: usize = 8;

/// Capacities of the two cache tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum finished rasters.
    pub full_capacity: NonZeroUsize,
    /// Maximum traced region sets.
    pub contour_capacity: NonZeroUsize,
}

impl CacheConfig {
    /// Build a config from plain counts, clamping zero to one.
    #[must_use]
    pub fn new(full_capacity: usize, contour_capacity: usize) -> Self {
        Self {
            full_capacity: NonZeroUsize::new(full_capacity).unwrap_or(NonZeroUsize::MIN),
            contour_capacity: NonZeroUsize::new(contour_capacity).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FULL_CAPACITY, DEFAULT_CONTOUR_CAPACITY)
    }
}

/// Bounded memo of rasters and traced regions for one source image.
pub struct RenderCache {
    full: LruCache<Fingerprint, Arc<RgbImage>>,
    contours: LruCache<Fingerprint, Arc<[Region]>>,
}

impl RenderCache {
    /// Create an empty cache with the given capacities.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            full: LruCache::new(config.full_capacity),
            contours: LruCache::new(config.contour_capacity),
        }
    }

    /// Finished raster for `fp`, marking it recently used.
    pub fn lookup_full(&mut self, fp: Fingerprint) -> Option<Arc<RgbImage>> {
        self.full.get(&fp).cloned()
    }

    /// Traced regions for `fp`, marking them recently used.
    pub fn lookup_contours(&mut self, fp: Fingerprint) -> Option<Arc<[Region]>> {
        self.contours.get(&fp).cloned()
    }

    /// Store a finished raster, evicting the least recently used one if
    /// the tier is full.
    pub fn store_full(&mut self, fp: Fingerprint, raster: Arc<RgbImage>) {
        self.full.put(fp, raster);
    }

    /// Store traced regions, evicting the least recently used set if the
    /// tier is full.
    pub fn store_contours(&mut self, fp: Fingerprint, regions: Arc<[Region]>) {
        self.contours.put(fp, regions);
    }

    /// Drop every entry in both tiers.
    pub fn invalidate_all(&mut self) {
        self.full.clear();
        self.contours.clear();
    }

    /// Number of cached rasters.
    #[must_use]
    pub fn full_len(&self) -> usize {
        self.full.len()
    }

    /// Number of cached region sets.
    #[must_use]
    pub fn contour_len(&self) -> usize {
        self.contours.len()
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
