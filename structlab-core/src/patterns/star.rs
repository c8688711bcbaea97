//! Morning / evening star: three-candle reversal shapes.

use crate::domain::Candle;

/// Maximum body of the middle (indecision) candle, as a fraction of the first body.
pub const INDECISION_BODY_RATIO: f64 = 0.5;

fn triple(candles: &[Candle], idx: usize) -> Option<(&Candle, &Candle, &Candle)> {
    if idx < 2 || idx >= candles.len() {
        return None;
    }
    Some((&candles[idx - 2], &candles[idx - 1], &candles[idx]))
}

/// Bullish reversal ending at `idx`.
///
/// Candle `idx-2` is bearish, candle `idx-1` has a body no larger than half of
/// it, and candle `idx` closes above the midpoint of the first body.
pub fn morning_star(candles: &[Candle], idx: usize) -> bool {
    let Some((first, middle, last)) = triple(candles, idx) else {
        return false;
    };

    if first.close >= first.open {
        return false;
    }
    if middle.body() > first.body() * INDECISION_BODY_RATIO {
        return false;
    }
    last.close > first.body_midpoint()
}

/// Bearish reversal ending at `idx`; mirror of [`morning_star`].
pub fn evening_star(candles: &[Candle], idx: usize) -> bool {
    let Some((first, middle, last)) = triple(candles, idx) else {
        return false;
    };

    if first.close <= first.open {
        return false;
    }
    if middle.body() > first.body() * INDECISION_BODY_RATIO {
        return false;
    }
    last.close < first.body_midpoint()
}
