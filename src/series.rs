// =============================================================================
// Tagged series — label-preserving adaptation around the kernel
// =============================================================================
//
// The kernel works on plain `&[f64]` slices and never branches on where the
// numbers came from. This module pairs a sample sequence with a parallel
// timestamp column so outputs stay aligned with the caller's time axis,
// element for element.

use serde::{Deserialize, Serialize};

use crate::engine::zscore::{self, ZScoreBands};
use crate::types::Bar;

/// A sample series tagged with epoch-millisecond timestamps.
///
/// Timestamps are carried, not interpreted: the engine is index-ordered and
/// assumes the caller supplied them sorted ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedSeries {
    timestamps: Vec<i64>,
    values: Vec<f64>,
}

/// Z-score output aligned to the input timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedZScore {
    pub timestamps: Vec<i64>,
    pub zscore: Vec<Option<f64>>,
}

/// Band output aligned to the input timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedBands {
    pub timestamps: Vec<i64>,
    pub bands: ZScoreBands,
}

impl TaggedSeries {
    /// Pair `timestamps` with `values`.
    ///
    /// Returns `None` when the two columns differ in length — a tagged series
    /// with a ragged label column has no meaningful alignment to preserve.
    pub fn new(timestamps: Vec<i64>, values: Vec<f64>) -> Option<Self> {
        if timestamps.len() != values.len() {
            return None;
        }
        Some(Self { timestamps, values })
    }

    /// Close column of `bars`, tagged with each bar's open time.
    pub fn from_bars(bars: &[Bar]) -> Self {
        Self {
            timestamps: bars.iter().map(Bar::open_time_millis).collect(),
            values: bars.iter().map(|b| b.close).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Rolling z-score of the series, tagged with the input timestamps.
    pub fn zscore(&self, period: usize) -> TaggedZScore {
        TaggedZScore {
            timestamps: self.timestamps.clone(),
            zscore: zscore::compute(&self.values, period),
        }
    }

    /// Rolling z-score plus deviation bands, tagged with the input
    /// timestamps.
    pub fn zscore_bands(
        &self,
        period: usize,
        upper_threshold: f64,
        lower_threshold: f64,
    ) -> TaggedBands {
        TaggedBands {
            timestamps: self.timestamps.clone(),
            bands: zscore::compute_with_bands(
                &self.values,
                period,
                upper_threshold,
                lower_threshold,
            ),
        }
    }
}
