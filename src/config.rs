// =============================================================================
// Engine configuration — serde-defaulted parameters with atomic save
// =============================================================================
//
// All tunables of the rolling-statistics engine live here so a host process
// can reload them without a rebuild. Persistence uses an atomic tmp + rename
// pattern to prevent corruption on crash, and every field carries a serde
// default so adding new fields never breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::window::{RollingWindow, ZScoreStream};
use crate::engine::zscore::{self, ZScoreBands};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_period() -> usize {
    20
}

fn default_upper_threshold() -> f64 {
    2.0
}

fn default_lower_threshold() -> f64 {
    -2.0
}

fn default_buffer_capacity() -> usize {
    500
}

// =============================================================================
// ZScoreConfig
// =============================================================================

/// Tunable parameters for the rolling z-score engine.
///
/// Every field has a serde default so that older JSON files missing new
/// fields will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZScoreConfig {
    /// Look-back window length. Values below 2 leave every output undefined.
    #[serde(default = "default_period")]
    pub period: usize,

    /// Upper band offset in standard-deviation units (conventionally
    /// positive, e.g. `2.0`).
    #[serde(default = "default_upper_threshold")]
    pub upper_threshold: f64,

    /// Lower band offset in standard-deviation units (conventionally
    /// negative, e.g. `-2.0`).
    ///
    /// The ordering of the two thresholds is never validated: an inverted
    /// pair silently produces an "upper" band numerically below the "lower"
    /// one.
    #[serde(default = "default_lower_threshold")]
    pub lower_threshold: f64,

    /// Capacity of streaming buffers built from this config. Keep it at or
    /// above `period` or buffered reads will never find a full window.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            upper_threshold: default_upper_threshold(),
            lower_threshold: default_lower_threshold(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl ZScoreConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            period = config.period,
            upper_threshold = config.upper_threshold,
            lower_threshold = config.lower_threshold,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    ///
    /// This prevents corruption if the process crashes mid-write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    // --- Glue: build engine pieces from the configured parameters ---------

    /// Rolling z-score of `closes` with the configured period.
    pub fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        zscore::compute(closes, self.period)
    }

    /// Rolling z-score plus deviation bands with the configured period and
    /// thresholds.
    pub fn compute_with_bands(&self, closes: &[f64]) -> ZScoreBands {
        zscore::compute_with_bands(
            closes,
            self.period,
            self.upper_threshold,
            self.lower_threshold,
        )
    }

    /// A fresh accumulator-carrying stream for the configured period.
    pub fn stream(&self) -> ZScoreStream {
        ZScoreStream::new(self.period)
    }

    /// A fresh caller-owned sample buffer of the configured capacity.
    pub fn window(&self) -> RollingWindow {
        RollingWindow::new(self.buffer_capacity)
    }
}
