// =============================================================================
// Rolling Sigma — streaming rolling-statistics engine for market time series
// =============================================================================
//
// Computes the rolling z-score of a close-price series — batch over a full
// slice, or incrementally against a live feed — with deviation bands derived
// from the same trailing window. The kernel keeps two running accumulators
// (sum and sum of squares) so a whole series costs a single O(n) pass.
//
// The engine is deliberately total: degenerate parameters produce full-length
// "undefined" outputs instead of errors, and a variance guard absorbs the
// floating-point rounding of the sum-of-squares shortcut so defined outputs
// are always finite for finite input.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
pub mod config;
pub mod engine;
pub mod hub;
pub mod series;
pub mod types;

// ── Public surface ───────────────────────────────────────────────────────────
pub use config::ZScoreConfig;
pub use engine::window::{BandPoint, RollingWindow, WindowStats, ZScoreStream};
pub use engine::zscore::{compute, compute_with_bands, ZScoreBands};
pub use hub::{SeriesKey, StreamHub};
pub use series::{TaggedBands, TaggedSeries, TaggedZScore};
pub use types::Bar;
