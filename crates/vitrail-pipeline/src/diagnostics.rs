//! Engine diagnostics: which cache tier served each operation, stage
//! timings, region counts, and running totals.
//!
//! Every successful [`MosaicEngine`](crate::MosaicEngine) operation
//! records an [`OperationReport`]. The counters make the cache behavior
//! observable, e.g. a colorization-only change leaves
//! [`RenderDiagnostics::extractions`] untouched.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::colorize::RegionCounts;
use crate::fingerprint::Fingerprint;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }

    /// The same encoding for an optional stage that may not have run.
    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(
            duration: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            duration.map(|d| d.as_secs_f64()).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Option::<f64>::deserialize(deserializer)?
                .map(|secs| {
                    Duration::try_from_secs_f64(secs).map_err(|_| {
                        serde::de::Error::custom(
                            "duration seconds must be finite, non-negative, and representable as a Duration",
                        )
                    })
                })
                .transpose()
        }
    }
}

/// How an operation obtained its raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderOutcome {
    /// Extraction and colorization both ran.
    Recomputed,
    /// Traced regions came from the contour cache; only colorization ran.
    ContourCacheHit,
    /// The finished raster came from the full cache.
    FullCacheHit,
}

impl fmt::Display for RenderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Recomputed => "recomputed",
            Self::ContourCacheHit => "contour cache hit",
            Self::FullCacheHit => "full cache hit",
        })
    }
}

/// Diagnostics for one successful operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationReport {
    /// Which cache tier, if any, served the operation.
    pub outcome: RenderOutcome,
    /// Fingerprint of the settings the raster was rendered with.
    pub fingerprint: Fingerprint,
    /// Time spent clustering and tracing, if extraction ran (seconds).
    #[serde(with = "duration_serde::option")]
    pub extraction: Option<Duration>,
    /// Time spent filtering and painting, if colorization ran (seconds).
    #[serde(with = "duration_serde::option")]
    pub colorization: Option<Duration>,
    /// Wall-clock duration of the whole operation (seconds).
    #[serde(with = "duration_serde")]
    pub total: Duration,
    /// Traced and kept region counts, if colorization ran.
    pub regions: Option<RegionCounts>,
}

/// Running totals plus the last operation's report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderDiagnostics {
    /// Times the extractor ran.
    pub extractions: u64,
    /// Times the colorizer ran.
    pub colorizations: u64,
    /// Operations served entirely from the full cache.
    pub full_cache_hits: u64,
    /// Operations that reused cached regions.
    pub contour_cache_hits: u64,
    /// The most recent successful operation.
    pub last: Option<OperationReport>,
}

impl RenderDiagnostics {
    /// Fold one operation into the totals.
    pub fn record(&mut self, report: OperationReport) {
        match report.outcome {
            RenderOutcome::Recomputed => {
                self.extractions += 1;
                self.colorizations += 1;
            }
            RenderOutcome::ContourCacheHit => {
                self.contour_cache_hits += 1;
                self.colorizations += 1;
            }
            RenderOutcome::FullCacheHit => self.full_cache_hits += 1,
        }
        self.last = Some(report);
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Render Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Extractions: {}  |  Colorizations: {}",
            self.extractions, self.colorizations,
        ));
        lines.push(format!(
            "Full cache hits: {}  |  Contour cache hits: {}",
            self.full_cache_hits, self.contour_cache_hits,
        ));

        let Some(last) = &self.last else {
            lines.push("No operation recorded.".to_string());
            return lines.join("\n");
        };

        lines.push(String::new());
        lines.push(format!(
            "Last operation: {} (settings {})",
            last.outcome, last.fingerprint,
        ));
        lines.push(format!("{:<16} {:>10}", "Stage", "Duration"));
        lines.push("-".repeat(28));
        for (name, duration) in [
            ("Extraction", last.extraction),
            ("Colorization", last.colorization),
        ] {
            match duration {
                Some(d) => lines.push(format!("{name:<16} {:>8.3}ms", duration_ms(d))),
                None => lines.push(format!("{name:<16} {:>10}", "skipped")),
            }
        }
        lines.push(format!("{:<16} {:>8.3}ms", "Total", duration_ms(last.total)));

        if let Some(regions) = last.regions {
            lines.push(String::new());
            lines.push(format!(
                "Regions: {} traced  |  {} kept",
                regions.traced, regions.kept,
            ));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
