//! Configuration store: the fixed set of tunable mosaic parameters.
//!
//! [`Settings`] is an explicit struct rather than a string-keyed bag.
//! Named access goes through [`Setting`], which knows each parameter's
//! canonical name, value type, default, and whether it feeds clustering.
//!
//! Values cross the named API as [`SettingValue`] and are coerced into
//! the field's type on assignment:
//!
//! - integer settings accept integers and integral floats,
//! - float settings accept integers and finite floats,
//! - `ColorScheme` accepts a scheme or its historic UI index (0, 1, 2).
//!
//! Only shape and sign are checked here. Structural clustering limits
//! (cluster count versus tile size, odd blur kernels, empty tiles) depend
//! on the image and are checked by [`crate::extract`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::extract::ClusterParams;
use crate::fingerprint::{Fingerprint, fingerprint};
use crate::types::ConfigError;

/// Strategy for deriving a region's fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Masked mean color with saturation/lightness adjustment.
    #[default]
    Original,
    /// Masked mean color written out as HSV bytes, no adjustment.
    Pop,
    /// Deterministic pseudo-random color seeded from the region geometry.
    Random,
}

impl ColorScheme {
    /// All schemes, in historic UI index order.
    pub const ALL: [Self; 3] = [Self::Original, Self::Pop, Self::Random];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Pop => "pop",
            Self::Random => "random",
        }
    }

    /// Position in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> i64 {
        match self {
            Self::Original => 0,
            Self::Pop => 1,
            Self::Random => 2,
        }
    }

    /// Look up a scheme by its UI index.
    #[must_use]
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnparseableValue(s.to_string()))
    }
}

/// A value crossing the named settings API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Color scheme.
    Scheme(ColorScheme),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Scheme(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for SettingValue {
    type Err = ConfigError;

    /// Parse `"3"` as an integer, `"0.5"` as a float, and `"pop"` as a
    /// scheme.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            return Ok(Self::Integer(v));
        }
        if let Ok(v) = trimmed.parse::<f64>() {
            return Ok(Self::Float(v));
        }
        trimmed
            .parse::<ColorScheme>()
            .map(Self::Scheme)
            .map_err(|_| ConfigError::UnparseableValue(s.to_string()))
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for SettingValue {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<ColorScheme> for SettingValue {
    fn from(v: ColorScheme) -> Self {
        Self::Scheme(v)
    }
}

/// The recognized setting names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Setting {
    /// Cluster count per tile.
    K,
    /// Tile grid size (G for a G×G partition).
    Grid,
    /// Odd box-blur kernel size.
    BlurSize,
    /// Minimum region area, percent of the tile area (exclusive).
    MinArea,
    /// Maximum region area, percent of the tile area (inclusive).
    MaxArea,
    /// Outline thickness in pixels.
    LineThickness,
    /// Saturation multiplier.
    Saturation,
    /// Lightness (HSV value) multiplier.
    Lightness,
    /// Fill color strategy.
    ColorScheme,
}

impl Setting {
    /// Every setting, in schema order.
    pub const ALL: [Self; 9] = [
        Self::K,
        Self::Grid,
        Self::BlurSize,
        Self::MinArea,
        Self::MaxArea,
        Self::LineThickness,
        Self::Saturation,
        Self::Lightness,
        Self::ColorScheme,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::K => "K",
            Self::Grid => "Grid",
            Self::BlurSize => "BlurSize",
            Self::MinArea => "MinArea",
            Self::MaxArea => "MaxArea",
            Self::LineThickness => "LineThickness",
            Self::Saturation => "Saturation",
            Self::Lightness => "Lightness",
            Self::ColorScheme => "ColorScheme",
        }
    }

    /// Whether changing this setting invalidates the traced regions.
    ///
    /// Exactly these settings make up the contour-cache key.
    #[must_use]
    pub const fn affects_clustering(self) -> bool {
        matches!(self, Self::K | Self::Grid | Self::BlurSize)
    }

    /// Short description of the accepted values.
    #[must_use]
    pub const fn value_type(self) -> &'static str {
        match self {
            Self::K | Self::Grid => "integer",
            Self::BlurSize => "odd positive integer",
            Self::LineThickness => "positive integer",
            Self::MinArea | Self::MaxArea => "percentage",
            Self::Saturation | Self::Lightness => "non-negative multiplier",
            Self::ColorScheme => "original | pop | random",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Setting {
    type Err = ConfigError;

    /// Names match case-insensitively, so the historic `colorScheme`
    /// spelling resolves too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|setting| setting.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownSetting(s.to_string()))
    }
}

/// The tunable mosaic parameters.
///
/// Fields are private; every write goes through [`Settings::set`], so
/// values held here have always passed validation. Deserialization goes
/// through the same path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSettings", into = "RawSettings")]
pub struct Settings {
    k: u32,
    grid: u32,
    blur_size: u32,
    min_area: f64,
    max_area: f64,
    line_thickness: u32,
    saturation: f64,
    lightness: f64,
    color_scheme: ColorScheme,
}

impl Settings {
    /// Default cluster count.
    pub const DEFAULT_K: u32 = 3;
    /// Default tile grid size.
    pub const DEFAULT_GRID: u32 = 2;
    /// Default blur kernel size.
    pub const DEFAULT_BLUR_SIZE: u32 = 9;
    /// Default minimum area percentage.
    pub const DEFAULT_MIN_AREA: f64 = 0.2;
    /// Default maximum area percentage.
    pub const DEFAULT_MAX_AREA: f64 = 100.0;
    /// Default outline thickness.
    pub const DEFAULT_LINE_THICKNESS: u32 = 2;
    /// Default saturation multiplier.
    pub const DEFAULT_SATURATION: f64 = 1.0;
    /// Default lightness multiplier.
    pub const DEFAULT_LIGHTNESS: f64 = 1.0;

    /// Current value of `setting`.
    #[must_use]
    pub fn value(&self, setting: Setting) -> SettingValue {
        match setting {
            Setting::K => self.k.into(),
            Setting::Grid => self.grid.into(),
            Setting::BlurSize => self.blur_size.into(),
            Setting::MinArea => self.min_area.into(),
            Setting::MaxArea => self.max_area.into(),
            Setting::LineThickness => self.line_thickness.into(),
            Setting::Saturation => self.saturation.into(),
            Setting::Lightness => self.lightness.into(),
            Setting::ColorScheme => self.color_scheme.into(),
        }
    }

    /// Current value of the setting called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSetting`] for names outside the
    /// schema.
    pub fn get(&self, name: &str) -> Result<SettingValue, ConfigError> {
        Ok(self.value(name.parse()?))
    }

    /// Assign `value` to `setting`.
    ///
    /// The store is unchanged when an error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] when the value has the wrong
    /// shape and [`ConfigError::InvalidValue`] when it is negative,
    /// non-finite, fractional where an integer is needed, or a zero line
    /// thickness.
    pub fn set(&mut self, setting: Setting, value: SettingValue) -> Result<(), ConfigError> {
        match setting {
            Setting::K => self.k = as_count(setting, value)?,
            Setting::Grid => self.grid = as_count(setting, value)?,
            Setting::BlurSize => self.blur_size = as_count(setting, value)?,
            Setting::MinArea => self.min_area = as_magnitude(setting, value)?,
            Setting::MaxArea => self.max_area = as_magnitude(setting, value)?,
            Setting::LineThickness => {
                let thickness = as_count(setting, value)?;
                if thickness == 0 {
                    return Err(ConfigError::InvalidValue {
                        setting,
                        reason: "line thickness must be at least 1 pixel".to_string(),
                    });
                }
                self.line_thickness = thickness;
            }
            Setting::Saturation => self.saturation = as_magnitude(setting, value)?,
            Setting::Lightness => self.lightness = as_magnitude(setting, value)?,
            Setting::ColorScheme => self.color_scheme = as_scheme(setting, value)?,
        }
        Ok(())
    }

    /// Assign `value` to the setting called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSetting`] for names outside the
    /// schema, otherwise as [`Settings::set`].
    pub fn set_named(&mut self, name: &str, value: SettingValue) -> Result<(), ConfigError> {
        self.set(name.parse()?, value)
    }

    /// Stable hash over every setting.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(Setting::ALL.into_iter().map(|s| (s, self.value(s))))
    }

    /// Stable hash over only the settings that affect clustering.
    #[must_use]
    pub fn clustering_fingerprint(&self) -> Fingerprint {
        fingerprint(
            Setting::ALL
                .into_iter()
                .filter(|s| s.affects_clustering())
                .map(|s| (s, self.value(s))),
        )
    }

    /// The clustering-relevant subset as extractor parameters.
    #[must_use]
    pub const fn cluster_params(&self) -> ClusterParams {
        ClusterParams {
            k: self.k,
            grid: self.grid,
            blur_size: self.blur_size,
        }
    }

    /// Cluster count.
    #[must_use]
    pub const fn k(&self) -> u32 {
        self.k
    }

    /// Tile grid size.
    #[must_use]
    pub const fn grid(&self) -> u32 {
        self.grid
    }

    /// Blur kernel size.
    #[must_use]
    pub const fn blur_size(&self) -> u32 {
        self.blur_size
    }

    /// Minimum area percentage.
    #[must_use]
    pub const fn min_area(&self) -> f64 {
        self.min_area
    }

    /// Maximum area percentage.
    #[must_use]
    pub const fn max_area(&self) -> f64 {
        self.max_area
    }

    /// Outline thickness in pixels.
    #[must_use]
    pub const fn line_thickness(&self) -> u32 {
        self.line_thickness
    }

    /// Saturation multiplier.
    #[must_use]
    pub const fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Lightness multiplier.
    #[must_use]
    pub const fn lightness(&self) -> f64 {
        self.lightness
    }

    /// Active color scheme.
    #[must_use]
    pub const fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            k: Self::DEFAULT_K,
            grid: Self::DEFAULT_GRID,
            blur_size: Self::DEFAULT_BLUR_SIZE,
            min_area: Self::DEFAULT_MIN_AREA,
            max_area: Self::DEFAULT_MAX_AREA,
            line_thickness: Self::DEFAULT_LINE_THICKNESS,
            saturation: Self::DEFAULT_SATURATION,
            lightness: Self::DEFAULT_LIGHTNESS,
            color_scheme: ColorScheme::default(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_count(setting: Setting, value: SettingValue) -> Result<u32, ConfigError> {
    let whole = match value {
        SettingValue::Integer(v) => v,
        SettingValue::Float(v) if v.is_finite() && v.fract() == 0.0 => v as i64,
        SettingValue::Float(_) | SettingValue::Scheme(_) => {
            return Err(ConfigError::TypeMismatch {
                setting,
                expected: "integer",
                found: value,
            });
        }
    };
    u32::try_from(whole).map_err(|_| ConfigError::InvalidValue {
        setting,
        reason: format!("{whole} is not a non-negative 32-bit integer"),
    })
}

#[allow(clippy::cast_precision_loss)]
fn as_magnitude(setting: Setting, value: SettingValue) -> Result<f64, ConfigError> {
    let v = match value {
        SettingValue::Integer(v) => v as f64,
        SettingValue::Float(v) => v,
        SettingValue::Scheme(_) => {
            return Err(ConfigError::TypeMismatch {
                setting,
                expected: "number",
                found: value,
            });
        }
    };
    if !v.is_finite() || v < 0.0 {
        return Err(ConfigError::InvalidValue {
            setting,
            reason: format!("{v} is not a finite non-negative number"),
        });
    }
    // Collapse -0.0 so equal values always fingerprint equally.
    Ok(v + 0.0)
}

fn as_scheme(setting: Setting, value: SettingValue) -> Result<ColorScheme, ConfigError> {
    match value {
        SettingValue::Scheme(s) => Ok(s),
        SettingValue::Integer(i) => {
            ColorScheme::from_index(i).ok_or_else(|| ConfigError::InvalidValue {
                setting,
                reason: format!("no color scheme with index {i}"),
            })
        }
        SettingValue::Float(_) => Err(ConfigError::TypeMismatch {
            setting,
            expected: "color scheme",
            found: value,
        }),
    }
}

/// Serde proxy for [`Settings`] with public, defaulted fields.
///
/// Conversion back into [`Settings`] replays every field through
/// [`Settings::set`] so deserialized values are validated.
#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct RawSettings {
    k: u32,
    grid: u32,
    blur_size: u32,
    min_area: f64,
    max_area: f64,
    line_thickness: u32,
    saturation: f64,
    lightness: f64,
    color_scheme: ColorScheme,
}

impl Default for RawSettings {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<Settings> for RawSettings {
    fn from(s: Settings) -> Self {
        Self {
            k: s.k,
            grid: s.grid,
            blur_size: s.blur_size,
            min_area: s.min_area,
            max_area: s.max_area,
            line_thickness: s.line_thickness,
            saturation: s.saturation,
            lightness: s.lightness,
            color_scheme: s.color_scheme,
        }
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let mut settings = Self::default();
        settings.set(Setting::K, raw.k.into())?;
        settings.set(Setting::Grid, raw.grid.into())?;
        settings.set(Setting::BlurSize, raw.blur_size.into())?;
        settings.set(Setting::MinArea, raw.min_area.into())?;
        settings.set(Setting::MaxArea, raw.max_area.into())?;
        settings.set(Setting::LineThickness, raw.line_thickness.into())?;
        settings.set(Setting::Saturation, raw.saturation.into())?;
        settings.set(Setting::Lightness, raw.lightness.into())?;
        settings.set(Setting::ColorScheme, raw.color_scheme.into())?;
        Ok(settings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_schema() {
        let s = Settings::default();
        assert_eq!(s.k(), 3);
        assert_eq!(s.grid(), 2);
        assert_eq!(s.blur_size(), 9);
        assert!((s.min_area() - 0.2).abs() < f64::EPSILON);
        assert!((s.max_area() - 100.0).abs() < f64::EPSILON);
        assert_eq!(s.line_thickness(), 2);
        assert!((s.saturation() - 1.0).abs() < f64::EPSILON);
        assert!((s.lightness() - 1.0).abs() < f64::EPSILON);
        assert_eq!(s.color_scheme(), ColorScheme::Original);
    }

    #[test]
    fn get_unknown_setting_fails() {
        let s = Settings::default();
        assert_eq!(
            s.get("Contrast"),
            Err(ConfigError::UnknownSetting("Contrast".to_string()))
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!("colorScheme".parse::<Setting>(), Ok(Setting::ColorScheme));
        assert_eq!("blursize".parse::<Setting>(), Ok(Setting::BlurSize));
        assert_eq!("k".parse::<Setting>(), Ok(Setting::K));
    }

    #[test]
    fn every_name_round_trips() {
        for setting in Setting::ALL {
            assert_eq!(setting.name().parse::<Setting>(), Ok(setting));
            assert_eq!(setting.to_string(), setting.name());
        }
    }

    #[test]
    fn set_then_get() {
        let mut s = Settings::default();
        s.set_named("K", SettingValue::Integer(7)).unwrap();
        s.set_named("Saturation", SettingValue::Float(1.5)).unwrap();
        s.set_named("ColorScheme", ColorScheme::Random.into()).unwrap();
        assert_eq!(s.get("K"), Ok(SettingValue::Integer(7)));
        assert_eq!(s.get("Saturation"), Ok(SettingValue::Float(1.5)));
        assert_eq!(
            s.get("ColorScheme"),
            Ok(SettingValue::Scheme(ColorScheme::Random))
        );
    }

    #[test]
    fn integral_float_coerces_to_integer_setting() {
        let mut s = Settings::default();
        s.set(Setting::Grid, SettingValue::Float(3.0)).unwrap();
        assert_eq!(s.grid(), 3);
    }

    #[test]
    fn fractional_float_rejected_for_integer_setting() {
        let mut s = Settings::default();
        let err = s.set(Setting::K, SettingValue::Float(2.5)).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { setting: Setting::K, .. }));
        assert_eq!(s.k(), Settings::DEFAULT_K);
    }

    #[test]
    fn integer_coerces_to_float_setting() {
        let mut s = Settings::default();
        s.set(Setting::MaxArea, SettingValue::Integer(50)).unwrap();
        assert!((s.max_area() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_values_rejected() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set(Setting::K, SettingValue::Integer(-1)),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            s.set(Setting::Lightness, SettingValue::Float(-0.5)),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn non_finite_rejected() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set(Setting::Saturation, SettingValue::Float(f64::NAN)),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            s.set(Setting::MinArea, SettingValue::Float(f64::INFINITY)),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn zero_line_thickness_rejected() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set(Setting::LineThickness, SettingValue::Integer(0)),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn scheme_accepts_ui_index() {
        let mut s = Settings::default();
        s.set(Setting::ColorScheme, SettingValue::Integer(1)).unwrap();
        assert_eq!(s.color_scheme(), ColorScheme::Pop);
        assert!(matches!(
            s.set(Setting::ColorScheme, SettingValue::Integer(3)),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            s.set(Setting::ColorScheme, SettingValue::Float(0.0)),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn scheme_rejected_for_numeric_setting() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set(Setting::BlurSize, ColorScheme::Pop.into()),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_parsing() {
        assert_eq!("3".parse::<SettingValue>(), Ok(SettingValue::Integer(3)));
        assert_eq!("0.5".parse::<SettingValue>(), Ok(SettingValue::Float(0.5)));
        assert_eq!(
            "Random".parse::<SettingValue>(),
            Ok(SettingValue::Scheme(ColorScheme::Random))
        );
        assert!(matches!(
            "bright".parse::<SettingValue>(),
            Err(ConfigError::UnparseableValue(_))
        ));
    }

    #[test]
    fn fingerprint_tracks_every_setting() {
        let base = Settings::default();
        let changes: [(Setting, SettingValue); 9] = [
            (Setting::K, SettingValue::Integer(4)),
            (Setting::Grid, SettingValue::Integer(3)),
            (Setting::BlurSize, SettingValue::Integer(5)),
            (Setting::MinArea, SettingValue::Float(1.0)),
            (Setting::MaxArea, SettingValue::Float(50.0)),
            (Setting::LineThickness, SettingValue::Integer(4)),
            (Setting::Saturation, SettingValue::Float(1.5)),
            (Setting::Lightness, SettingValue::Float(0.5)),
            (Setting::ColorScheme, SettingValue::Scheme(ColorScheme::Pop)),
        ];
        for (setting, value) in changes {
            let mut changed = base.clone();
            changed.set(setting, value).unwrap();
            assert_ne!(
                changed.fingerprint(),
                base.fingerprint(),
                "{setting} did not change the fingerprint"
            );
            assert_eq!(
                changed.clustering_fingerprint() != base.clustering_fingerprint(),
                setting.affects_clustering(),
                "{setting} clustering fingerprint mismatch"
            );
        }
    }

    #[test]
    fn setting_same_value_keeps_fingerprint() {
        let mut s = Settings::default();
        let before = s.fingerprint();
        s.set(Setting::K, SettingValue::Float(3.0)).unwrap();
        s.set(Setting::MinArea, SettingValue::Float(0.2)).unwrap();
        assert_eq!(s.fingerprint(), before);
    }

    #[test]
    fn negative_zero_fingerprints_like_zero() {
        let mut a = Settings::default();
        let mut b = Settings::default();
        a.set(Setting::MinArea, SettingValue::Float(0.0)).unwrap();
        b.set(Setting::MinArea, SettingValue::Float(-0.0)).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn only_clustering_settings_affect_clustering() {
        let clustering: Vec<Setting> = Setting::ALL
            .into_iter()
            .filter(|s| s.affects_clustering())
            .collect();
        assert_eq!(clustering, vec![Setting::K, Setting::Grid, Setting::BlurSize]);
    }

    #[test]
    fn serde_round_trip() {
        let mut s = Settings::default();
        s.set(Setting::K, SettingValue::Integer(5)).unwrap();
        s.set(Setting::ColorScheme, ColorScheme::Random.into()).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"K": 6, "ColorScheme": "pop"}"#).unwrap();
        assert_eq!(s.k(), 6);
        assert_eq!(s.color_scheme(), ColorScheme::Pop);
        assert_eq!(s.grid(), Settings::DEFAULT_GRID);
    }

    #[test]
    fn deserialize_validates() {
        let result: Result<Settings, _> = serde_json::from_str(r#"{"LineThickness": 0}"#);
        assert!(result.is_err());
    }
}
