// =============================================================================
// Rolling Z-Score — incremental single-pass kernel
// =============================================================================
//
// The z-score measures how many standard deviations the newest close sits
// from its trailing window mean:
//
//   mean_t     = sum(close[t-period+1 ..= t]) / period
//   variance_t = sum_sq / period - mean_t²        (population variance)
//   z_t        = (close_t - mean_t) / sqrt(variance_t)
//
// Both running sums are maintained incrementally: each step adds the entering
// sample and subtracts the leaving one, so a whole series costs one O(n) pass
// with two scalar accumulators instead of an O(n · period) window rescan.
//
// Variance guard: the sum-of-squares shortcut can round to a slightly
// negative variance on quiet, low-volatility data. Any variance <= 0 counts
// as "no dispersion" and the z-score is emitted as 0.0 — never a division by
// zero, never the square root of a negative number.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Band series produced by [`compute_with_bands`].
///
/// All four vectors have the same length as the input and share one
/// definedness boundary: `None` for every index before `period - 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZScoreBands {
    /// Z-score of each close against its trailing window.
    pub zscore: Vec<Option<f64>>,
    /// `mean + upper_threshold * std` per defined index.
    pub upper: Vec<Option<f64>>,
    /// `mean + lower_threshold * std` per defined index.
    pub lower: Vec<Option<f64>>,
    /// Trailing window mean per defined index.
    pub mean: Vec<Option<f64>>,
}

impl ZScoreBands {
    fn undefined(n: usize) -> Self {
        Self {
            zscore: vec![None; n],
            upper: vec![None; n],
            lower: vec![None; n],
            mean: vec![None; n],
        }
    }
}

/// Compute the rolling z-score series for `closes` with look-back `period`.
///
/// The output always has the same length as `closes`. Index `i` is `Some`
/// exactly when `i >= period - 1`; earlier indices have no complete window.
///
/// # Edge cases
/// - `period < 2` => every element is `None` (a single-sample window has no
///   dispersion to measure). This is a defined outcome, not an error.
/// - `closes.len() < period` => every element is `None`.
/// - A window with zero (or negatively rounded) variance yields `Some(0.0)`.
/// - NaN/Inf samples are not sanitized: they poison the running sums for the
///   rest of the pass. A poisoned window's variance is unordered, so the
///   guard fires and the z-score falls back to `0.0` (the band mean line in
///   [`compute_with_bands`] goes NaN instead). Filter upstream if needed.
pub fn compute(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    if period < 2 || n < period {
        return vec![None; n];
    }

    let period_f = period as f64;
    let mut out = vec![None; n];

    // Seed the accumulators with the first full window.
    let mut sum = 0.0_f64;
    let mut sum_sq = 0.0_f64;
    for &x in &closes[..period] {
        sum += x;
        sum_sq += x * x;
    }
    out[period - 1] = Some(zscore_at(closes[period - 1], sum, sum_sq, period_f));

    // Slide: add the entering sample, drop the leaving one.
    for i in period..n {
        let old = closes[i - period];
        let new = closes[i];
        sum += new - old;
        sum_sq += new * new - old * old;
        out[i] = Some(zscore_at(new, sum, sum_sq, period_f));
    }

    out
}

/// Compute the rolling z-score together with deviation bands around the
/// rolling mean.
///
/// Per defined index: `mean` is the trailing window mean, `upper = mean +
/// upper_threshold * std` and `lower = mean + lower_threshold * std`, with
/// `std = sqrt(max(variance, 0))` so the guard fires before the square root.
///
/// The thresholds are plain multipliers in standard-deviation units
/// (conventionally `+2.0` / `-2.0`). Their ordering is **not** validated: an
/// inverted pair silently produces an "upper" band numerically below the
/// "lower" one.
///
/// Shares every edge case of [`compute`].
pub fn compute_with_bands(
    closes: &[f64],
    period: usize,
    upper_threshold: f64,
    lower_threshold: f64,
) -> ZScoreBands {
    let n = closes.len();
    if period < 2 || n < period {
        return ZScoreBands::undefined(n);
    }

    let period_f = period as f64;
    let mut bands = ZScoreBands::undefined(n);

    let mut sum = 0.0_f64;
    let mut sum_sq = 0.0_f64;
    for &x in &closes[..period] {
        sum += x;
        sum_sq += x * x;
    }
    emit_bands(
        &mut bands,
        period - 1,
        closes[period - 1],
        sum,
        sum_sq,
        period_f,
        upper_threshold,
        lower_threshold,
    );

    for i in period..n {
        let old = closes[i - period];
        let new = closes[i];
        sum += new - old;
        sum_sq += new * new - old * old;
        emit_bands(
            &mut bands,
            i,
            new,
            sum,
            sum_sq,
            period_f,
            upper_threshold,
            lower_threshold,
        );
    }

    bands
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Z-score of `sample` given the window's running sums.
///
/// Applies the variance guard: any variance <= 0 maps to a z-score of 0.0.
fn zscore_at(sample: f64, sum: f64, sum_sq: f64, period_f: f64) -> f64 {
    let mean = sum / period_f;
    let variance = sum_sq / period_f - mean * mean;
    if variance > 0.0 {
        (sample - mean) / variance.sqrt()
    } else {
        0.0
    }
}

/// Fill one index of every band series from the window's running sums.
#[allow(clippy::too_many_arguments)]
fn emit_bands(
    bands: &mut ZScoreBands,
    i: usize,
    sample: f64,
    sum: f64,
    sum_sq: f64,
    period_f: f64,
    upper_threshold: f64,
    lower_threshold: f64,
) {
    let mean = sum / period_f;
    let variance = sum_sq / period_f - mean * mean;
    let std_dev = variance.max(0.0).sqrt();

    let z = if variance > 0.0 {
        (sample - mean) / std_dev
    } else {
        0.0
    };

    bands.zscore[i] = Some(z);
    bands.mean[i] = Some(mean);
    bands.upper[i] = Some(mean + upper_threshold * std_dev);
    bands.lower[i] = Some(mean + lower_threshold * std_dev);
}
