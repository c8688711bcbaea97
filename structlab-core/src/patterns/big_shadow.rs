//! Big shadow: a range-expansion candle that closes with intent.

use crate::domain::{Candle, Direction};

use super::{closes_strongly_bearish, closes_strongly_bullish};

/// Number of preceding candles whose ranges the big shadow must exceed.
pub const BIG_SHADOW_WINDOW: usize = 6;

/// Range expansion with a strong close in `direction`.
///
/// The candle at `idx` must have a high-low range strictly greater than every
/// one of the (up to) six candles before it. With no predecessors the
/// comparison is against zero. On top of that the close must sit in the top
/// quarter (bullish) or bottom quarter (bearish) of the move from the open.
pub fn big_shadow(candles: &[Candle], idx: usize, direction: Direction) -> bool {
    let Some(candle) = candles.get(idx) else {
        return false;
    };

    let window_start = idx.saturating_sub(BIG_SHADOW_WINDOW);
    let prior_max = candles[window_start..idx]
        .iter()
        .map(Candle::range)
        .fold(0.0_f64, f64::max);

    if candle.range() <= prior_max {
        return false;
    }

    match direction {
        Direction::Bullish => closes_strongly_bullish(candle.open, candle.close, candle.high),
        Direction::Bearish => closes_strongly_bearish(candle.open, candle.close, candle.low),
    }
}
