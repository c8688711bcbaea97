//! Candle: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol on a single timeframe.
///
/// A series of candles is always ordered oldest first with unique timestamps.
/// Every index used by the structure pipeline is a position in such a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// High-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute open-close distance.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Midpoint of the open-close body.
    pub fn body_midpoint(&self) -> f64 {
        (self.open + self.close) / 2.0
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Returns true if any OHLC field is not a finite number.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// Close-price series of a candle slice, in the same order.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_candle() -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
            open: 1.0850,
            high: 1.0900,
            low: 1.0820,
            close: 1.0880,
            volume: 1_250.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut candle = sample_candle();
        candle.close = f64::NAN;
        assert!(candle.is_void());
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        let mut candle = sample_candle();
        candle.high = 1.0810; // below low
        assert!(!candle.is_sane());
    }

    #[test]
    fn range_body_and_midpoint() {
        let c = sample_candle();
        assert!((c.range() - 0.0080).abs() < 1e-12);
        assert!((c.body() - 0.0030).abs() < 1e-12);
        assert!((c.body_midpoint() - 1.0865).abs() < 1e-12);
        assert!(c.is_bullish());
        assert!(!c.is_bearish());
    }

    #[test]
    fn closes_preserves_order() {
        let mut a = sample_candle();
        let mut b = sample_candle();
        a.close = 1.0;
        b.close = 2.0;
        assert_eq!(closes(&[a, b]), vec![1.0, 2.0]);
    }
}
