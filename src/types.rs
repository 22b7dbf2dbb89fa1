// =============================================================================
// Shared data types consumed by the rolling-statistics engine
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV bar as supplied by the market-data layer.
///
/// The engine only ever reads `open_time` and `close`; the remaining fields
/// ride along so consumers can render full candles from the same payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time, serialized as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    /// Open time as epoch milliseconds — the tag carried through
    /// [`TaggedSeries`](crate::series::TaggedSeries) outputs.
    pub fn open_time_millis(&self) -> i64 {
        self.open_time.timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar(millis: i64, close: f64) -> Bar {
        Bar {
            open_time: Utc.timestamp_millis_opt(millis).unwrap(),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn open_time_millis_roundtrips() {
        let bar = sample_bar(1_700_000_000_000, 37_020.0);
        assert_eq!(bar.open_time_millis(), 1_700_000_000_000);
    }

    #[test]
    fn serde_uses_epoch_milliseconds() {
        let bar = sample_bar(1_700_000_000_000, 100.0);
        let json = serde_json::to_string(&bar).unwrap();
        assert!(json.contains("1700000000000"), "got {json}");

        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(back.open_time, bar.open_time);
        assert!((back.close - bar.close).abs() < f64::EPSILON);
    }

    #[test]
    fn volume_defaults_when_missing() {
        let json = r#"{
            "open_time": 1700000000000,
            "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5
        }"#;
        let bar: Bar = serde_json::from_str(json).unwrap();
        assert_eq!(bar.volume, 0.0);
    }
}
