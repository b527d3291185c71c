//! The render pipeline coordinator.
//!
//! [`MosaicEngine`] owns the source image, the settings, and the render
//! cache. Every mutation re-renders synchronously, consulting the cache
//! tiers in order:
//!
//! 1. full cache, keyed by every setting: reuse the finished raster;
//! 2. contour cache, keyed by K, Grid, and BlurSize: reuse the traced
//!    regions and only colorize;
//! 3. otherwise extract and colorize from scratch.
//!
//! Failed operations leave the engine exactly as it was: the previous
//! settings, image, and last raster stay in place and nothing is
//! published.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, RenderCache};
use crate::colorize::colorize;
use crate::diagnostics::{OperationReport, RenderDiagnostics, RenderOutcome};
use crate::extract::extract_regions;
use crate::settings::{Setting, SettingValue, Settings};
use crate::types::{MosaicError, Region, RgbImage};

/// Lifecycle state of a [`MosaicEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// No image has been loaded yet.
    Idle,
    /// An image is loaded and the last render is current.
    Ready,
    /// An operation is in progress.
    Recomputing,
}

/// Receives every raster the engine publishes, fresh or cached.
pub trait RenderListener {
    /// Called once per successful operation, after the raster is stored.
    fn on_render(&mut self, raster: &Arc<RgbImage>);
}

impl<F: FnMut(&Arc<RgbImage>)> RenderListener for F {
    fn on_render(&mut self, raster: &Arc<RgbImage>) {
        self(raster);
    }
}

/// Engine construction options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cache tier capacities.
    pub cache: CacheConfig,
}

/// Settings-driven mosaic renderer with a two-tier cache.
pub struct MosaicEngine {
    config: EngineConfig,
    settings: Settings,
    image: Option<Arc<RgbImage>>,
    cache: RenderCache,
    state: EngineState,
    last_render: Option<Arc<RgbImage>>,
    listener: Option<Box<dyn RenderListener>>,
    diagnostics: RenderDiagnostics,
}

impl MosaicEngine {
    /// An idle engine with default settings and cache capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// An idle engine with default settings and the given capacities.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            settings: Settings::default(),
            image: None,
            cache: RenderCache::new(config.cache),
            state: EngineState::Idle,
            last_render: None,
            listener: None,
            diagnostics: RenderDiagnostics::default(),
        }
    }

    /// Register the observer that receives every published raster,
    /// replacing any previous one.
    pub fn set_listener(&mut self, listener: impl RenderListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Remove the observer, if any.
    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Replace the source image and render it with the current settings.
    ///
    /// Both cache tiers are discarded once the new image renders.
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::InvalidInput`] for a zero-sized image or
    /// when the current settings cannot be applied to it. The previous
    /// image, caches, and last render are kept in that case.
    pub fn set_image(&mut self, image: RgbImage) -> Result<Arc<RgbImage>, MosaicError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(MosaicError::InvalidInput(format!(
                "image must be non-empty, got {width}x{height}",
            )));
        }
        info!(width, height, "loading image");

        let image = Arc::new(image);
        let previous = self.state;
        self.state = EngineState::Recomputing;

        let mut cache = RenderCache::new(self.config.cache);
        match render(&mut cache, &image, &self.settings) {
            Ok((raster, report)) => {
                self.cache = cache;
                self.image = Some(image);
                self.publish(&raster, report);
                Ok(raster)
            }
            Err(err) => {
                self.state = previous;
                warn!(%err, "image render failed, keeping previous image");
                Err(err)
            }
        }
    }

    /// Assign the setting called `name` and re-render.
    ///
    /// Returns `Ok(None)` while no image is loaded: the value is stored
    /// and used by the first [`set_image`](Self::set_image).
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::Config`] for unknown names or invalid
    /// values, or [`MosaicError::InvalidInput`] when the new settings
    /// cannot be applied to the image. The previous settings are restored
    /// in either case.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<SettingValue>,
    ) -> Result<Option<Arc<RgbImage>>, MosaicError> {
        let setting: Setting = name.parse()?;
        self.set_setting(setting, value.into())
    }

    /// Assign `setting` and re-render. See [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// As [`set`](Self::set).
    pub fn set_setting(
        &mut self,
        setting: Setting,
        value: SettingValue,
    ) -> Result<Option<Arc<RgbImage>>, MosaicError> {
        let previous_settings = self.settings.clone();
        self.settings.set(setting, value)?;
        debug!(%setting, %value, "setting changed");

        let Some(image) = self.image.clone() else {
            return Ok(None);
        };

        let previous = self.state;
        self.state = EngineState::Recomputing;
        match render(&mut self.cache, &image, &self.settings) {
            Ok((raster, report)) => {
                self.publish(&raster, report);
                Ok(Some(raster))
            }
            Err(err) => {
                self.settings = previous_settings;
                self.state = previous;
                warn!(%setting, %err, "render failed, settings restored");
                Err(err)
            }
        }
    }

    /// Replace every setting at once and re-render.
    ///
    /// # Errors
    ///
    /// As [`set`](Self::set); the previous settings are restored on
    /// failure.
    pub fn apply_settings(
        &mut self,
        settings: Settings,
    ) -> Result<Option<Arc<RgbImage>>, MosaicError> {
        let previous_settings = std::mem::replace(&mut self.settings, settings);

        let Some(image) = self.image.clone() else {
            return Ok(None);
        };

        let previous = self.state;
        self.state = EngineState::Recomputing;
        match render(&mut self.cache, &image, &self.settings) {
            Ok((raster, report)) => {
                self.publish(&raster, report);
                Ok(Some(raster))
            }
            Err(err) => {
                self.settings = previous_settings;
                self.state = previous;
                warn!(%err, "render failed, settings restored");
                Err(err)
            }
        }
    }

    /// Current value of the setting called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MosaicError::Config`] for unknown names.
    pub fn get(&self, name: &str) -> Result<SettingValue, MosaicError> {
        Ok(self.settings.get(name)?)
    }

    /// The current settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// The most recently published raster.
    #[must_use]
    pub fn last_render(&self) -> Option<Arc<RgbImage>> {
        self.last_render.clone()
    }

    /// The current source image.
    #[must_use]
    pub fn image(&self) -> Option<Arc<RgbImage>> {
        self.image.clone()
    }

    /// Counters and the last operation's report.
    #[must_use]
    pub const fn diagnostics(&self) -> &RenderDiagnostics {
        &self.diagnostics
    }

    /// Cached raster and region-set counts.
    #[must_use]
    pub fn cache_len(&self) -> (usize, usize) {
        (self.cache.full_len(), self.cache.contour_len())
    }

    fn publish(&mut self, raster: &Arc<RgbImage>, report: OperationReport) {
        info!(
            outcome = %report.outcome,
            fingerprint = %report.fingerprint,
            elapsed_ms = report.total.as_secs_f64() * 1000.0,
            "rendered mosaic",
        );
        self.state = EngineState::Ready;
        self.last_render = Some(Arc::clone(raster));
        self.diagnostics.record(report);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_render(raster);
        }
    }
}

impl Default for MosaicEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Render `image` under `settings`, using and filling `cache`.
fn render(
    cache: &mut RenderCache,
    image: &RgbImage,
    settings: &Settings,
) -> Result<(Arc<RgbImage>, OperationReport), MosaicError> {
    let start = Instant::now();
    let fingerprint = settings.fingerprint();

    if let Some(raster) = cache.lookup_full(fingerprint) {
        debug!(%fingerprint, "full cache hit");
        return Ok((
            raster,
            OperationReport {
                outcome: RenderOutcome::FullCacheHit,
                fingerprint,
                extraction: None,
                colorization: None,
                total: start.elapsed(),
                regions: None,
            },
        ));
    }

    let contour_key = settings.clustering_fingerprint();
    let (regions, extraction, outcome) = match cache.lookup_contours(contour_key) {
        Some(regions) => {
            debug!(fingerprint = %contour_key, regions = regions.len(), "contour cache hit");
            (regions, None, RenderOutcome::ContourCacheHit)
        }
        None => {
            let extract_start = Instant::now();
            let regions: Arc<[Region]> = extract_regions(image, &settings.cluster_params())?.into();
            let elapsed = extract_start.elapsed();
            cache.store_contours(contour_key, Arc::clone(&regions));
            (regions, Some(elapsed), RenderOutcome::Recomputed)
        }
    };

    let colorize_start = Instant::now();
    let colorized = colorize(&regions, image, settings)?;
    let colorization = colorize_start.elapsed();

    let raster = Arc::new(colorized.raster);
    cache.store_full(fingerprint, Arc::clone(&raster));

    Ok((
        raster,
        OperationReport {
            outcome,
            fingerprint,
            extraction,
            colorization: Some(colorization),
            total: start.elapsed(),
            regions: Some(colorized.counts),
        },
    ))
}
