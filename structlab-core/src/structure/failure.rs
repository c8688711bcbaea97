//! Failure confirmation: the higher-low / lower-high that completes a structure.

use crate::domain::{Candle, Direction};
use crate::patterns::{validate_failure_candle, PriceZone};

use super::bos::BosEvent;
use super::swing::{SwingPoint, SwingSet};

/// Pluggable candle-confirmation rule for failure candidates.
///
/// Implemented for any `Fn(usize) -> bool`, so callers can pass a closure over
/// their own series. The rule sees only the index of the candidate swing.
pub trait FailureConfirmation {
    fn confirms(&self, index: usize) -> bool;
}

impl<F> FailureConfirmation for F
where
    F: Fn(usize) -> bool,
{
    fn confirms(&self, index: usize) -> bool {
        self(index)
    }
}

/// Pass-through rule: every structurally valid candidate is confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlwaysConfirm;

impl FailureConfirmation for AlwaysConfirm {
    fn confirms(&self, _index: usize) -> bool {
        true
    }
}

/// Candle-pattern rule backed by [`validate_failure_candle`].
///
/// The provisional zone for a candidate is the interval between the broken
/// level and the candidate's close.
#[derive(Debug, Clone, Copy)]
pub struct PatternConfirmation<'a> {
    candles: &'a [Candle],
    direction: Direction,
    level_price: f64,
}

impl<'a> PatternConfirmation<'a> {
    pub fn new(candles: &'a [Candle], bos: &BosEvent) -> Self {
        Self { candles, direction: bos.direction, level_price: bos.level.price }
    }
}

impl FailureConfirmation for PatternConfirmation<'_> {
    fn confirms(&self, index: usize) -> bool {
        let Some(candle) = self.candles.get(index) else {
            return false;
        };
        let zone = PriceZone::spanning(self.level_price, candle.close);
        validate_failure_candle(self.candles, index, self.direction, zone)
    }
}

/// Find the failure point that confirms `bos`.
///
/// Bullish: the most recent swing low after the break that holds above the
/// broken high. Bearish: the most recent swing high after the break that
/// stays below the broken low. Candidates are scanned newest first and the
/// first one accepted by `confirm` wins; `None` means the structure is not
/// complete yet.
pub fn detect_failure<C>(bos: &BosEvent, swings: &SwingSet, confirm: &C) -> Option<SwingPoint>
where
    C: FailureConfirmation + ?Sized,
{
    let level = bos.level.price;
    let candidates = match bos.direction {
        Direction::Bullish => &swings.lows,
        Direction::Bearish => &swings.highs,
    };
    let holds = |price: f64| match bos.direction {
        Direction::Bullish => price > level,
        Direction::Bearish => price < level,
    };

    candidates
        .iter()
        .rev()
        .find(|p| p.index > bos.index && holds(p.price) && confirm.confirms(p.index))
        .copied()
}
