// =============================================================================
// StreamHub — per-series streaming z-score registry
// =============================================================================
//
// One `ZScoreStream` per `(symbol, interval)` pair. A single producer (the
// tick/message handler) pushes samples; `push` holds the write lock for the
// whole append-then-recompute step, so readers observe each tick atomically.
// Readers take the shared lock and never mutate.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::window::{BandPoint, WindowStats, ZScoreStream};

/// Composite key that identifies a unique sample series.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeriesKey {
    pub symbol: String,
    pub interval: String,
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.symbol, self.interval)
    }
}

/// Thread-safe registry of streaming z-score state per series key.
///
/// Every tracked series shares one look-back `period`, fixed at construction.
/// Unknown keys are registered lazily on first `push`.
pub struct StreamHub {
    streams: RwLock<HashMap<SeriesKey, ZScoreStream>>,
    period: usize,
}

impl StreamHub {
    /// Create a hub whose streams all use the given look-back `period`.
    pub fn new(period: usize) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            period,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed one sample into the series for `key`, registering the series on
    /// first use. Returns the z-score of the new window, or `None` while that
    /// series is still warming up.
    pub fn push(&self, key: SeriesKey, sample: f64) -> Option<f64> {
        let mut map = self.streams.write();
        let stream = map
            .entry(key.clone())
            .or_insert_with(|| ZScoreStream::new(self.period));
        let zscore = stream.update(sample);

        debug!(key = %key, sample, zscore = ?zscore, "series update");
        zscore
    }

    /// Z-score of the most recent sample for `key`, if that series is ready.
    pub fn latest(&self, key: &SeriesKey) -> Option<f64> {
        self.streams.read().get(key).and_then(ZScoreStream::latest)
    }

    /// Window statistics for `key`, if that series is ready.
    pub fn stats(&self, key: &SeriesKey) -> Option<WindowStats> {
        self.streams.read().get(key).and_then(ZScoreStream::stats)
    }

    /// Deviation bands for `key`, if that series is ready.
    pub fn bands(
        &self,
        key: &SeriesKey,
        upper_threshold: f64,
        lower_threshold: f64,
    ) -> Option<BandPoint> {
        self.streams
            .read()
            .get(key)
            .and_then(|s| s.bands(upper_threshold, lower_threshold))
    }

    /// Number of samples currently buffered for `key`.
    pub fn buffered(&self, key: &SeriesKey) -> usize {
        self.streams.read().get(key).map_or(0, ZScoreStream::len)
    }

    /// Number of series the hub is tracking.
    pub fn series_count(&self) -> usize {
        self.streams.read().len()
    }
}
