// =============================================================================
// Streaming windows — per-tick rolling z-score state
// =============================================================================
//
// Two streaming paths cover the live-feed use case:
//
//   RollingWindow — a caller-owned bounded FIFO of the most recent samples.
//                   Every read recomputes mean/variance from the buffer
//                   contents. Right for interactive feed rates where the
//                   window is small and ticks are slow; a bad sample drops
//                   out of the result once it is evicted.
//   ZScoreStream  — persists the running sum / sum-of-squares across ticks
//                   with the same incremental update as the batch kernel.
//                   O(1) per tick; right for high tick rates.
//
// Both paths produce the value the batch kernel produces for the prefix
// ending at the same tick, modulo floating-point summation order.
// =============================================================================

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

// =============================================================================
// Window snapshots
// =============================================================================

/// Mean / variance / standard deviation of one trailing window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowStats {
    /// Trailing window mean.
    pub mean: f64,
    /// Population variance, clamped at zero.
    pub variance: f64,
    /// `sqrt(variance)` after the clamp — always a real, non-negative number.
    pub std_dev: f64,
}

impl WindowStats {
    /// Build a snapshot from a raw (possibly negatively rounded) variance.
    fn from_raw(mean: f64, variance: f64) -> Self {
        let variance = variance.max(0.0);
        Self {
            mean,
            variance,
            std_dev: variance.sqrt(),
        }
    }

    /// Distance of `sample` from the window mean in standard deviations.
    ///
    /// A zero-dispersion window maps every sample to `0.0` — distance from
    /// the mean is defined as zero, not an error and not infinity.
    pub fn zscore_of(&self, sample: f64) -> f64 {
        if self.variance > 0.0 {
            (sample - self.mean) / self.std_dev
        } else {
            0.0
        }
    }

    /// Deviation bands around the mean for the given threshold multipliers.
    ///
    /// Threshold ordering is not validated (see [`compute_with_bands`]).
    ///
    /// [`compute_with_bands`]: crate::engine::zscore::compute_with_bands
    pub fn band_point(
        &self,
        sample: f64,
        upper_threshold: f64,
        lower_threshold: f64,
    ) -> BandPoint {
        BandPoint {
            zscore: self.zscore_of(sample),
            upper: self.mean + upper_threshold * self.std_dev,
            lower: self.mean + lower_threshold * self.std_dev,
            mean: self.mean,
        }
    }
}

/// One point of the deviation bands around the rolling mean.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BandPoint {
    pub zscore: f64,
    pub upper: f64,
    pub lower: f64,
    pub mean: f64,
}

// =============================================================================
// RollingWindow — bounded FIFO with recompute-on-read
// =============================================================================

/// Caller-owned bounded buffer of the most recent samples.
///
/// `push` appends; once the buffer reaches capacity the oldest sample is
/// evicted (FIFO). Reads recompute the trailing-window statistics from the
/// buffer contents, so the capacity may exceed the look-back period — keep
/// `capacity >= period` or the reads will never find a full window.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    /// Create a window retaining at most `capacity` samples (floored at 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one once at capacity.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Number of samples currently buffered.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True once the buffer holds `capacity` samples.
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample, if any.
    pub fn latest_sample(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    /// Statistics of the trailing `period` samples.
    ///
    /// Returns `None` when `period < 2` or fewer than `period` samples are
    /// buffered.
    pub fn stats(&self, period: usize) -> Option<WindowStats> {
        if period < 2 || self.samples.len() < period {
            return None;
        }

        let mut sum = 0.0_f64;
        let mut sum_sq = 0.0_f64;
        for &x in self.samples.iter().skip(self.samples.len() - period) {
            sum += x;
            sum_sq += x * x;
        }

        let period_f = period as f64;
        let mean = sum / period_f;
        Some(WindowStats::from_raw(mean, sum_sq / period_f - mean * mean))
    }

    /// Z-score of the newest sample against the trailing `period` window.
    pub fn zscore(&self, period: usize) -> Option<f64> {
        let stats = self.stats(period)?;
        Some(stats.zscore_of(self.latest_sample()?))
    }

    /// Deviation bands of the trailing `period` window.
    pub fn bands(
        &self,
        period: usize,
        upper_threshold: f64,
        lower_threshold: f64,
    ) -> Option<BandPoint> {
        let stats = self.stats(period)?;
        Some(stats.band_point(self.latest_sample()?, upper_threshold, lower_threshold))
    }
}

// =============================================================================
// ZScoreStream — persisted accumulators
// =============================================================================

/// Streaming z-score with accumulators carried across ticks.
///
/// The window is sized exactly `period`: each `update` evicts the oldest
/// sample once full and adjusts `sum` / `sum_sq` by the entering and leaving
/// samples, exactly like one step of the batch kernel.
///
/// A `period < 2` stream never becomes ready and every read returns `None`.
/// NaN/Inf samples are not sanitized: once one enters the accumulators it
/// never cancels back out of the running sums (use [`RollingWindow`] when the
/// feed cannot guarantee clean data).
#[derive(Debug, Clone)]
pub struct ZScoreStream {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
}

impl ZScoreStream {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            window: VecDeque::with_capacity(period.max(1)),
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Number of samples currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// True once the window is full and the period is usable.
    pub fn is_ready(&self) -> bool {
        self.period >= 2 && self.window.len() == self.period
    }

    /// Feed one sample and return the z-score of the new window, or `None`
    /// while warming up (or forever, when `period < 2`).
    pub fn update(&mut self, sample: f64) -> Option<f64> {
        if self.window.len() == self.period.max(1) {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
                self.sum_sq -= old * old;
            }
        }
        self.window.push_back(sample);
        self.sum += sample;
        self.sum_sq += sample * sample;

        self.latest()
    }

    /// Statistics of the current window, once ready.
    pub fn stats(&self) -> Option<WindowStats> {
        if !self.is_ready() {
            return None;
        }
        let period_f = self.period as f64;
        let mean = self.sum / period_f;
        Some(WindowStats::from_raw(
            mean,
            self.sum_sq / period_f - mean * mean,
        ))
    }

    /// Z-score of the most recent sample, once ready.
    pub fn latest(&self) -> Option<f64> {
        let stats = self.stats()?;
        let sample = self.window.back().copied()?;
        Some(stats.zscore_of(sample))
    }

    /// Deviation bands of the current window, once ready.
    pub fn bands(&self, upper_threshold: f64, lower_threshold: f64) -> Option<BandPoint> {
        let stats = self.stats()?;
        let sample = self.window.back().copied()?;
        Some(stats.band_point(sample, upper_threshold, lower_threshold))
    }

    /// Drop all buffered samples and zero the accumulators.
    pub fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
        self.sum_sq = 0.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::zscore::compute;

    fn wavy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.37).sin() * 5.0 + (i % 7) as f64 * 0.9)
            .collect()
    }

    fn assert_close(a: f64, b: f64) {
        let tol = 1e-9 * a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() <= tol, "got {a}, expected {b}");
    }

    // ---- RollingWindow ---------------------------------------------------

    #[test]
    fn window_trims_to_capacity() {
        let mut w = RollingWindow::new(3);
        for i in 0..5 {
            w.push(i as f64);
        }
        assert_eq!(w.len(), 3);
        assert!(w.is_full());
        assert_eq!(w.latest_sample(), Some(4.0));
    }

    #[test]
    fn window_zero_capacity_floored_at_one() {
        let mut w = RollingWindow::new(0);
        w.push(1.0);
        w.push(2.0);
        assert_eq!(w.len(), 1);
        assert_eq!(w.latest_sample(), Some(2.0));
    }

    #[test]
    fn window_stats_need_full_period() {
        let mut w = RollingWindow::new(10);
        for i in 0..4 {
            w.push(i as f64);
        }
        assert!(w.stats(5).is_none());
        assert!(w.zscore(5).is_none());
        w.push(4.0);
        assert!(w.stats(5).is_some());
    }

    #[test]
    fn window_period_below_two_never_defined() {
        let mut w = RollingWindow::new(10);
        for i in 0..10 {
            w.push(i as f64);
        }
        assert!(w.zscore(0).is_none());
        assert!(w.zscore(1).is_none());
    }

    #[test]
    fn window_matches_batch_at_every_tick() {
        let closes = wavy(80);
        let period = 14;
        let batch = compute(&closes, period);

        let mut w = RollingWindow::new(200);
        for (i, &c) in closes.iter().enumerate() {
            w.push(c);
            match (w.zscore(period), batch[i]) {
                (Some(a), Some(b)) => assert_close(a, b),
                (None, None) => {}
                (a, b) => panic!("parity mismatch at tick {i}: {a:?} vs {b:?}"),
            }
        }
    }

    #[test]
    fn window_uses_trailing_period_of_larger_buffer() {
        // Buffer retains 6 samples but stats should only see the last 3.
        let mut w = RollingWindow::new(6);
        for &x in &[1000.0, 1000.0, 1000.0, 2.0, 4.0, 6.0] {
            w.push(x);
        }
        let stats = w.stats(3).unwrap();
        assert_close(stats.mean, 4.0);
    }

    #[test]
    fn window_recovers_after_bad_sample_evicted() {
        let mut w = RollingWindow::new(3);
        w.push(f64::NAN);
        w.push(1.0);
        w.push(2.0);
        // The NaN is still inside the window: the mean is poisoned.
        assert!(w.stats(3).unwrap().mean.is_nan());

        // One more push evicts the NaN from the buffer entirely.
        w.push(3.0);
        let z = w.zscore(3).unwrap();
        assert!(z.is_finite());
        assert!(z > 0.0);
    }

    #[test]
    fn window_flat_zero_zscore() {
        let mut w = RollingWindow::new(5);
        for _ in 0..5 {
            w.push(42.0);
        }
        assert_eq!(w.zscore(5), Some(0.0));
        let bands = w.bands(5, 2.0, -2.0).unwrap();
        assert_eq!(bands.upper, 42.0);
        assert_eq!(bands.lower, 42.0);
        assert_eq!(bands.mean, 42.0);
    }

    // ---- ZScoreStream ----------------------------------------------------

    #[test]
    fn stream_none_until_window_full() {
        let mut s = ZScoreStream::new(5);
        for i in 0..4 {
            assert!(s.update(i as f64).is_none());
            assert!(!s.is_ready());
        }
        assert!(s.update(4.0).is_some());
        assert!(s.is_ready());
    }

    #[test]
    fn stream_period_below_two_never_ready() {
        let mut s = ZScoreStream::new(1);
        for i in 0..10 {
            assert!(s.update(i as f64).is_none());
        }
        assert!(!s.is_ready());
        assert!(s.stats().is_none());
        // The internal buffer stays bounded even though it never reports.
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn stream_matches_batch_at_every_tick() {
        let closes = wavy(120);
        let period = 20;
        let batch = compute(&closes, period);

        let mut s = ZScoreStream::new(period);
        for (i, &c) in closes.iter().enumerate() {
            match (s.update(c), batch[i]) {
                (Some(a), Some(b)) => assert_close(a, b),
                (None, None) => {}
                (a, b) => panic!("parity mismatch at tick {i}: {a:?} vs {b:?}"),
            }
        }
    }

    #[test]
    fn stream_and_window_agree() {
        let closes = wavy(60);
        let period = 10;
        let mut s = ZScoreStream::new(period);
        let mut w = RollingWindow::new(period);
        for &c in &closes {
            let a = s.update(c);
            w.push(c);
            let b = w.zscore(period);
            match (a, b) {
                (Some(a), Some(b)) => assert_close(a, b),
                (None, None) => {}
                (a, b) => panic!("path mismatch: {a:?} vs {b:?}"),
            }
        }
    }

    #[test]
    fn stream_flat_window_zero() {
        let mut s = ZScoreStream::new(4);
        let mut last = None;
        for _ in 0..8 {
            last = s.update(7.5);
        }
        assert_eq!(last, Some(0.0));
    }

    #[test]
    fn stream_known_scenario() {
        let closes = [1.0, 1.0, 1.0, 1.0, 1.0, 2.0];
        let mut s = ZScoreStream::new(5);
        let mut out = Vec::new();
        for &c in &closes {
            out.push(s.update(c));
        }
        assert!(out[..4].iter().all(Option::is_none));
        assert_eq!(out[4], Some(0.0));
        assert_close(out[5].unwrap(), 2.0);
    }

    #[test]
    fn stream_bands_consistent_with_stats() {
        let closes = wavy(40);
        let mut s = ZScoreStream::new(10);
        for &c in &closes {
            s.update(c);
        }
        let stats = s.stats().unwrap();
        let bands = s.bands(2.0, -2.0).unwrap();
        assert_close(bands.upper - bands.mean, 2.0 * stats.std_dev);
        assert_close(bands.lower - bands.mean, -2.0 * stats.std_dev);
        assert_close(bands.mean, stats.mean);
    }

    #[test]
    fn stream_reset_starts_warmup_over() {
        let mut s = ZScoreStream::new(3);
        for i in 0..5 {
            s.update(i as f64);
        }
        assert!(s.is_ready());
        s.reset();
        assert!(!s.is_ready());
        assert!(s.is_empty());
        assert!(s.update(1.0).is_none());
    }

    #[test]
    fn stats_zscore_of_guard() {
        let stats = WindowStats::from_raw(10.0, -1.0e-12);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.zscore_of(10.0), 0.0);
        assert_eq!(stats.zscore_of(999.0), 0.0);
    }
}
