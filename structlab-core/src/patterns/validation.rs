//! Confirmation rules built from the pattern predicates.
//!
//! Failure confirmation (while a zone is being built) and entry confirmation
//! (on a return into a finished zone) currently apply the same rule. They are
//! separate operations because they belong to different phases and are
//! expected to diverge.

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, Direction};

use super::{big_shadow, evening_star, morning_star, penetrates_zone};

/// Closed price interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceZone {
    pub low: f64,
    pub high: f64,
}

impl PriceZone {
    /// Interval spanned by two prices in either order.
    pub fn spanning(a: f64, b: f64) -> Self {
        Self { low: a.min(b), high: a.max(b) }
    }
}

fn reversal_pattern(candles: &[Candle], idx: usize, direction: Direction) -> bool {
    match direction {
        Direction::Bullish => morning_star(candles, idx),
        Direction::Bearish => evening_star(candles, idx),
    }
}

fn zone_touch_with_pattern(
    candles: &[Candle],
    idx: usize,
    direction: Direction,
    zone: PriceZone,
) -> bool {
    let Some(candle) = candles.get(idx) else {
        return false;
    };
    if !penetrates_zone(candle.high, candle.low, zone.low, zone.high) {
        return false;
    }
    big_shadow(candles, idx, direction) || reversal_pattern(candles, idx, direction)
}

/// Confirms a higher-low / lower-high candidate after a break of structure.
pub fn validate_failure_candle(
    candles: &[Candle],
    idx: usize,
    direction: Direction,
    zone: PriceZone,
) -> bool {
    zone_touch_with_pattern(candles, idx, direction, zone)
}

/// Confirms an entry on a return into a completed zone.
pub fn validate_entry_candle(
    candles: &[Candle],
    idx: usize,
    direction: Direction,
    zone: PriceZone,
) -> bool {
    zone_touch_with_pattern(candles, idx, direction, zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_support::series;

    fn morning_star_series() -> Vec<Candle> {
        series(&[
            (110.0, 110.5, 99.5, 100.0),
            (100.0, 101.0, 98.0, 99.0),
            (99.0, 107.0, 98.5, 106.0),
        ])
    }

    #[test]
    fn spanning_orders_bounds() {
        let z = PriceZone::spanning(1.2, 1.1);
        assert_eq!(z.low, 1.1);
        assert_eq!(z.high, 1.2);
    }

    #[test]
    fn entry_needs_zone_penetration() {
        let candles = morning_star_series();
        // last candle spans 98.5..107.0
        let inside = PriceZone { low: 100.0, high: 102.0 };
        let above = PriceZone { low: 108.0, high: 110.0 };
        assert!(validate_entry_candle(&candles, 2, Direction::Bullish, inside));
        assert!(!validate_entry_candle(&candles, 2, Direction::Bullish, above));
    }

    #[test]
    fn entry_uses_direction_appropriate_star() {
        let candles = morning_star_series();
        let zone = PriceZone { low: 100.0, high: 102.0 };
        // the last candle is bullish and not a big shadow in the bearish sense
        assert!(!validate_entry_candle(&candles, 2, Direction::Bearish, zone));
    }

    #[test]
    fn big_shadow_alone_is_sufficient() {
        let mut rows = vec![(100.0, 100.5, 99.5, 100.2); 6];
        rows.push((100.0, 104.0, 99.8, 103.5));
        let candles = series(&rows);
        let zone = PriceZone { low: 99.0, high: 100.0 };
        assert!(validate_failure_candle(&candles, 6, Direction::Bullish, zone));
    }

    #[test]
    fn failure_and_entry_rules_agree() {
        let candles = morning_star_series();
        for zone in [
            PriceZone { low: 100.0, high: 102.0 },
            PriceZone { low: 200.0, high: 201.0 },
        ] {
            for dir in [Direction::Bullish, Direction::Bearish] {
                assert_eq!(
                    validate_failure_candle(&candles, 2, dir, zone),
                    validate_entry_candle(&candles, 2, dir, zone)
                );
            }
        }
    }

    #[test]
    fn out_of_range_index_never_confirms() {
        let candles = morning_star_series();
        let zone = PriceZone { low: 0.0, high: 1_000.0 };
        assert!(!validate_entry_candle(&candles, 3, Direction::Bullish, zone));
    }
}
