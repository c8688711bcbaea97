//! Candle pattern library: stateless predicates over the last one to three candles.
//!
//! Patterns are used in two places: as the failure-confirmation rule while a
//! structure zone is being built, and as the live entry check once a zone
//! exists. Every predicate takes the full series plus the index of the candle
//! under test and only looks backwards from it. An index outside the series
//! never matches.

pub mod big_shadow;
pub mod star;
pub mod validation;

pub use big_shadow::{big_shadow, BIG_SHADOW_WINDOW};
pub use star::{evening_star, morning_star};
pub use validation::{validate_entry_candle, validate_failure_candle, PriceZone};

/// Fraction of the open-to-extreme distance a strong close must fall within.
pub const STRONG_CLOSE_FRACTION: f64 = 0.25;

/// Bullish candle closing in the top quarter of its open-to-high distance.
pub fn closes_strongly_bullish(open: f64, close: f64, high: f64) -> bool {
    close > open && close >= high - STRONG_CLOSE_FRACTION * (high - open)
}

/// Bearish candle closing in the bottom quarter of its open-to-low distance.
pub fn closes_strongly_bearish(open: f64, close: f64, low: f64) -> bool {
    close < open && close <= low + STRONG_CLOSE_FRACTION * (open - low)
}

/// True iff the candle's range overlaps the zone (touching counts).
pub fn penetrates_zone(high: f64, low: f64, zone_low: f64, zone_high: f64) -> bool {
    high >= zone_low && low <= zone_high
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::Candle;
    use chrono::{Duration, TimeZone, Utc};

    /// Build a series from (open, high, low, close) tuples on an hourly grid.
    pub fn series(ohlc: &[(f64, f64, f64, f64)]) -> Vec<Candle> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        ohlc.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| Candle {
                timestamp: base + Duration::hours(i as i64),
                open,
                high,
                low,
                close,
                volume: 100.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_bullish_close() {
        // open 100, high 110: threshold 107.5
        assert!(closes_strongly_bullish(100.0, 108.0, 110.0));
        assert!(closes_strongly_bullish(100.0, 107.5, 110.0));
        assert!(!closes_strongly_bullish(100.0, 107.0, 110.0));
        // must close above the open
        assert!(!closes_strongly_bullish(100.0, 100.0, 100.0));
    }

    #[test]
    fn strong_bearish_close() {
        // open 100, low 90: threshold 92.5
        assert!(closes_strongly_bearish(100.0, 91.0, 90.0));
        assert!(closes_strongly_bearish(100.0, 92.5, 90.0));
        assert!(!closes_strongly_bearish(100.0, 93.0, 90.0));
        assert!(!closes_strongly_bearish(100.0, 100.0, 100.0));
    }

    #[test]
    fn zone_penetration_includes_touching_edges() {
        assert!(penetrates_zone(1.10, 1.05, 1.08, 1.12));
        assert!(penetrates_zone(1.08, 1.00, 1.08, 1.12)); // high touches zone low
        assert!(penetrates_zone(1.20, 1.12, 1.08, 1.12)); // low touches zone high
        assert!(!penetrates_zone(1.07, 1.00, 1.08, 1.12)); // entirely below
        assert!(!penetrates_zone(1.20, 1.13, 1.08, 1.12)); // entirely above
    }
}
